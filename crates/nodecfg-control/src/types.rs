//! Request and response types for controller operations.
//!
//! These types define the API contracts for configuration-state management.

use chrono::{DateTime, Utc};
use nodecfg_core::node_arch;
use nodecfg_store::{ConfigState, Device};
use serde::{Deserialize, Serialize};

/// Request field that state-related input faults refer to.
pub const STATE_FIELD: &str = "configstate.state";

/// The configuration state as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigStateView {
    /// Current state.
    pub state: ConfigState,
}

impl ConfigStateView {
    /// The view reported when no device is registered.
    #[must_use]
    pub fn unregistered() -> Self {
        Self {
            state: ConfigState::default(),
        }
    }
}

impl From<&Device> for ConfigStateView {
    fn from(device: &Device) -> Self {
        Self {
            state: device.config_state,
        }
    }
}

/// Request to change the configuration state.
///
/// The state is kept as raw text so unsupported values can be reported as
/// input faults rather than rejected by deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigStateRequest {
    /// Requested state name.
    #[serde(default)]
    pub state: Option<String>,
}

impl ConfigStateRequest {
    /// Request a move into `state`.
    #[must_use]
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
        }
    }
}

/// Notification that a dependency was provisioned as a local service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCreated {
    /// Derived service name.
    pub service_name: String,
    /// Dependency URL.
    pub spec_ref: String,
    /// Dependency organization.
    pub org: String,
    /// Provisioned version.
    pub version: String,
    /// When the service was created.
    pub created_at: DateTime<Utc>,
}

/// Result of a configuration-state update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigStateUpdate {
    /// The state after the update.
    pub configstate: ConfigStateView,
    /// Services created while entering the configured state, in creation
    /// order.
    pub policies_created: Vec<PolicyCreated>,
}

/// Request to record the device registration on this node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterDeviceRequest {
    /// Device identifier issued by the registry.
    pub id: String,
    /// Organization the device belongs to.
    pub organization: String,
    /// Registration token.
    pub token: String,
    /// Human-readable name. Defaults to the ID.
    #[serde(default)]
    pub name: Option<String>,
    /// Pattern, either `org/name` or a name within the device's organization.
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Configuration for the controller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlConfig {
    /// Architecture reported to the registry. Detected from the build
    /// target when unset.
    #[serde(default)]
    pub arch: Option<String>,
}

impl ControlConfig {
    /// Create a configuration with a fixed architecture.
    #[must_use]
    pub fn with_arch(arch: impl Into<String>) -> Self {
        Self {
            arch: Some(arch.into()),
        }
    }

    /// The architecture this node resolves workloads for.
    #[must_use]
    pub fn node_arch(&self) -> String {
        self.arch.clone().unwrap_or_else(node_arch)
    }
}
