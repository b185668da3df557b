//! HTTP surface for the controller.
//!
//! # Routes
//!
//! - `GET /health` - Health check
//! - `GET /configstate` - Current configuration state
//! - `PUT /configstate` - Request a configuration-state change
//! - `POST /device` - Record the device registration

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::{ControlError, FaultKind};
use crate::service::NodeControl;
use crate::types::{ConfigStateRequest, ConfigStateUpdate, ConfigStateView, RegisterDeviceRequest};

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

/// API error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(ControlError);

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self.0.kind() {
            FaultKind::NotFound => "not_found",
            FaultKind::InvalidInput => "invalid_input",
            FaultKind::Systemic => "internal_error",
        }
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ControlError::InvalidInput {
            field: "body",
            message: rejection.body_text(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let message = if self.0.kind() == FaultKind::Systemic {
            tracing::error!(error = %self.0, "Internal error");
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                field: self.0.field(),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: "nodecfg-control",
    })
}

async fn get_config_state<C: NodeControl + 'static>(
    State(control): State<Arc<C>>,
) -> Result<Json<ConfigStateView>, ApiError> {
    Ok(Json(control.config_state().await?))
}

async fn put_config_state<C: NodeControl + 'static>(
    State(control): State<Arc<C>>,
    payload: Result<Json<ConfigStateRequest>, JsonRejection>,
) -> Result<Json<ConfigStateUpdate>, ApiError> {
    let Json(body) = payload?;
    Ok(Json(control.update_config_state(body).await?))
}

#[derive(Serialize)]
struct DeviceResponse {
    id: String,
    organization: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    configstate: ConfigStateView,
}

async fn register_device<C: NodeControl + 'static>(
    State(control): State<Arc<C>>,
    payload: Result<Json<RegisterDeviceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let device = control.register_device(body).await?;

    let response = DeviceResponse {
        id: device.id.to_string(),
        organization: device.org.clone(),
        name: device.name.clone(),
        pattern: device.pattern.as_ref().map(ToString::to_string),
        configstate: ConfigStateView::from(&device),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Create the controller router.
pub fn create_router<C: NodeControl + 'static>(control: Arc<C>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/configstate",
            get(get_config_state::<C>).put(put_config_state::<C>),
        )
        .route("/device", post(register_device::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(control)
}
