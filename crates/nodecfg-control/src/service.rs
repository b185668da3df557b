//! Controller service implementation.
//!
//! This module provides the `NodeControl` trait and the `ConfigStateService`
//! implementation that sequences a configuration-state change: validate the
//! transition, resolve and provision the node's pattern when entering the
//! configured state, then persist the new state.

use std::sync::Arc;

use async_trait::async_trait;
use nodecfg_core::{DeviceId, PatternId};
use nodecfg_registry::{PatternSource, Requester, WorkloadResolver};
use nodecfg_store::{ConfigState, Device, Store};

use crate::error::{ControlError, Result};
use crate::lifecycle::{self, Transition};
use crate::provision::{self, ServiceProvisioner};
use crate::resolver;
use crate::types::{
    ConfigStateRequest, ConfigStateUpdate, ConfigStateView, ControlConfig, PolicyCreated,
    RegisterDeviceRequest,
};

/// Trait defining the controller operations.
#[async_trait]
pub trait NodeControl: Send + Sync {
    /// Get the node's configuration state.
    ///
    /// A node with no registered device reports `configuring`.
    async fn config_state(&self) -> Result<ConfigStateView>;

    /// Request a configuration-state change.
    ///
    /// Entering the configured state provisions every dependency of the
    /// node's pattern that is not already present.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::DeviceNotRegistered` if no device is recorded,
    /// an invalid-input error for unsupported states, transitions, or
    /// dependencies that need manual configuration, and a systemic error if
    /// a collaborator fails.
    async fn update_config_state(&self, request: ConfigStateRequest) -> Result<ConfigStateUpdate>;

    /// Record the device registration for this node.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if a field is malformed or a device is
    /// already registered.
    async fn register_device(&self, request: RegisterDeviceRequest) -> Result<Device>;
}

/// The main controller service implementation.
pub struct ConfigStateService<S, R, P>
where
    S: Store,
    R: PatternSource + WorkloadResolver,
    P: ServiceProvisioner,
{
    store: Arc<S>,
    registry: Arc<R>,
    provisioner: Arc<P>,
    config: ControlConfig,
}

impl<S, R, P> ConfigStateService<S, R, P>
where
    S: Store,
    R: PatternSource + WorkloadResolver,
    P: ServiceProvisioner,
{
    /// Create a new controller service.
    #[must_use]
    pub fn new(store: Arc<S>, registry: Arc<R>, provisioner: Arc<P>, config: ControlConfig) -> Self {
        Self {
            store,
            registry,
            provisioner,
            config,
        }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(store: Arc<S>, registry: Arc<R>, provisioner: Arc<P>) -> Self {
        Self::new(store, registry, provisioner, ControlConfig::default())
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Resolve the device's pattern and provision its dependencies.
    async fn autoconfigure(&self, device: &Device, pattern: &PatternId) -> Result<Vec<PolicyCreated>> {
        tracing::info!(device_id = %device.id, pattern = %pattern, "Configstate autoconfig starting");

        let arch = self.config.node_arch();
        let requester = Requester::new(device.id.clone(), device.token.clone());

        let deps = resolver::resolve_pattern(
            &*self.registry,
            &*self.registry,
            pattern,
            &requester,
            &arch,
        )
        .await?;

        let created = provision::provision_all(&*self.provisioner, &deps, &arch).await?;

        tracing::info!(
            device_id = %device.id,
            dependencies = deps.len(),
            created = created.len(),
            "Configstate autoconfig complete"
        );

        Ok(created)
    }
}

fn required_field(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ControlError::InvalidInput {
            field,
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn parse_pattern(raw: &str, device_org: &str) -> Result<PatternId> {
    let parsed = if raw.contains('/') {
        raw.parse()
    } else {
        PatternId::new(device_org, raw)
    };

    parsed.map_err(|e| ControlError::InvalidInput {
        field: "device.pattern",
        message: e.to_string(),
    })
}

#[async_trait]
impl<S, R, P> NodeControl for ConfigStateService<S, R, P>
where
    S: Store + 'static,
    R: PatternSource + WorkloadResolver + 'static,
    P: ServiceProvisioner + 'static,
{
    async fn config_state(&self) -> Result<ConfigStateView> {
        Ok(self
            .store
            .get_device()?
            .as_ref()
            .map_or_else(ConfigStateView::unregistered, ConfigStateView::from))
    }

    async fn update_config_state(&self, request: ConfigStateRequest) -> Result<ConfigStateUpdate> {
        let device = self
            .store
            .get_device()?
            .ok_or(ControlError::DeviceNotRegistered)?;

        tracing::debug!(device_id = %device.id, state = %device.config_state, "Update configstate");

        let requested = lifecycle::parse_requested_state(request.state.as_deref().unwrap_or_default())?;

        let target = match lifecycle::plan_transition(device.config_state, requested)? {
            Transition::NoOp => {
                return Ok(ConfigStateUpdate {
                    configstate: ConfigStateView::from(&device),
                    policies_created: Vec::new(),
                });
            }
            Transition::Apply(target) => target,
        };

        let policies_created = match &device.pattern {
            Some(pattern) if target == ConfigState::Configured => {
                self.autoconfigure(&device, pattern).await?
            }
            _ => Vec::new(),
        };

        let updated = self.store.set_config_state(&device.id, target)?;

        tracing::info!(
            device_id = %updated.id,
            from = %device.config_state,
            to = %updated.config_state,
            "Configuration state changed"
        );

        Ok(ConfigStateUpdate {
            configstate: ConfigStateView::from(&updated),
            policies_created,
        })
    }

    async fn register_device(&self, request: RegisterDeviceRequest) -> Result<Device> {
        required_field(&request.organization, "device.organization")?;
        required_field(&request.token, "device.token")?;
        let id = DeviceId::new(request.id).map_err(|e| ControlError::InvalidInput {
            field: "device.id",
            message: e.to_string(),
        })?;

        if let Some(existing) = self.store.get_device()? {
            return Err(ControlError::AlreadyRegistered(existing.id));
        }

        let mut device = Device::new(id, request.organization, request.token);
        if let Some(name) = request.name.filter(|n| !n.trim().is_empty()) {
            device.name = name;
        }
        if let Some(raw) = request.pattern.as_deref().filter(|p| !p.is_empty()) {
            device.pattern = Some(parse_pattern(raw, &device.org)?);
        }

        self.store.put_device(&device)?;

        tracing::info!(
            device_id = %device.id,
            org = %device.org,
            pattern = ?device.pattern,
            "Registered device"
        );

        Ok(device)
    }
}
