//! Domain types stored by the node.
//!
//! These types represent the persisted device registration and the services
//! provisioned on its behalf.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use nodecfg_core::{DeviceId, PatternId};
use serde::{Deserialize, Serialize};

/// Configuration state of a node.
///
/// A node starts out `Configuring` and moves to `Configured` once it is
/// ready for operation. The reverse transition is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigState {
    /// Initial state; also reported when no device is registered.
    #[default]
    Configuring,
    /// The node is active.
    Configured,
}

impl ConfigState {
    /// Every supported state, in lifecycle order.
    pub const ALL: [Self; 2] = [Self::Configuring, Self::Configured];

    /// The wire name of this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuring => "configuring",
            Self::Configured => "configured",
        }
    }

    /// Parse a wire name. Returns `None` for anything other than the two
    /// supported values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.as_str() == s)
    }
}

impl fmt::Display for ConfigState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The device record for this node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Identifier issued at registration.
    pub id: DeviceId,
    /// Organization the device is registered in.
    pub org: String,
    /// Registration token used for registry requests.
    pub token: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Pattern the node runs, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternId>,
    /// Current configuration state.
    pub config_state: ConfigState,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// Create a device record in the `Configuring` state with no pattern.
    #[must_use]
    pub fn new(id: DeviceId, org: impl Into<String>, token: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: id.to_string(),
            id,
            org: org.into(),
            token: token.into(),
            pattern: None,
            config_state: ConfigState::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a pattern to this device.
    #[must_use]
    pub fn with_pattern(mut self, pattern: PatternId) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

/// A service provisioned on this node for a resolved dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Derived service name.
    pub name: String,
    /// URL identifying the dependency.
    pub spec_ref: String,
    /// Organization that publishes the dependency.
    pub org: String,
    /// Version provisioned.
    pub version: String,
    /// Hardware architecture of the provisioned definition.
    #[serde(default)]
    pub arch: String,
    /// Configuration variables supplied for the service.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
