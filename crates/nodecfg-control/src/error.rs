//! Error types for the configuration-state controller.
//!
//! Every error belongs to exactly one [`FaultKind`]. Not-found and
//! invalid-input faults carry a message meant for the node owner; systemic
//! faults carry the underlying collaborator error for diagnostics.

use nodecfg_core::{DeviceId, PatternId};
use nodecfg_registry::RegistryError;
use nodecfg_store::{ConfigState, StoreError};
use thiserror::Error;

use crate::types::STATE_FIELD;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Classification of a controller fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// A required record does not exist.
    NotFound,
    /// The caller asked for something unsupported or must act first.
    InvalidInput,
    /// A collaborator failed or misbehaved.
    Systemic,
}

/// Errors that can occur in controller operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// No device is registered on this node.
    #[error(
        "device registration not recorded: complete device registration before changing the configuration state"
    )]
    DeviceNotRegistered,

    /// A device is already registered on this node.
    #[error("device {0} is already registered")]
    AlreadyRegistered(DeviceId),

    /// The requested state is not one of the supported values.
    #[error("supported state values are 'configuring' and 'configured', got {0:?}")]
    UnsupportedState(String),

    /// The requested state change is not supported.
    #[error("transition from '{from}' to '{to}' is not supported")]
    UnsupportedTransition {
        /// The current state.
        from: ConfigState,
        /// The requested state.
        to: ConfigState,
    },

    /// A dependency cannot be provisioned automatically.
    #[error("dependency {spec_ref} {org} {version} requires manual configuration: {reason}")]
    ManualConfigRequired {
        /// Dependency URL.
        spec_ref: String,
        /// Dependency organization.
        org: String,
        /// Dependency version.
        version: String,
        /// What the node owner must supply.
        reason: String,
    },

    /// A request field failed validation.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// The pattern could not be fetched.
    #[error("unable to read pattern {pattern} from the registry: {source}")]
    PatternFetch {
        /// The pattern requested.
        pattern: PatternId,
        /// The registry error.
        #[source]
        source: RegistryError,
    },

    /// The registry returned the wrong number of patterns.
    #[error("expected exactly 1 pattern from the registry, received {0}")]
    PatternCount(usize),

    /// The registry response did not contain the requested pattern key.
    #[error("pattern {expected} not found in registry response, received {received:?}")]
    PatternKeyMismatch {
        /// The key requested.
        expected: String,
        /// The keys returned.
        received: Vec<String>,
    },

    /// A workload version could not be resolved.
    #[error("error resolving workload {url} {org} {version} {arch}: {source}")]
    WorkloadResolution {
        /// Workload URL.
        url: String,
        /// Workload organization.
        org: String,
        /// Workload version.
        version: String,
        /// Node architecture.
        arch: String,
        /// The registry error.
        #[source]
        source: RegistryError,
    },

    /// Provisioning a dependency failed unexpectedly.
    #[error("unexpected error creating service {service}: {detail}")]
    Provisioning {
        /// Derived service name.
        service: String,
        /// Collaborator detail.
        detail: String,
    },

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ControlError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> FaultKind {
        match self {
            Self::DeviceNotRegistered => FaultKind::NotFound,
            Self::AlreadyRegistered(_)
            | Self::UnsupportedState(_)
            | Self::UnsupportedTransition { .. }
            | Self::ManualConfigRequired { .. }
            | Self::InvalidInput { .. } => FaultKind::InvalidInput,
            Self::PatternFetch { .. }
            | Self::PatternCount(_)
            | Self::PatternKeyMismatch { .. }
            | Self::WorkloadResolution { .. }
            | Self::Provisioning { .. }
            | Self::Store(_) => FaultKind::Systemic,
        }
    }

    /// The request field an invalid-input fault refers to.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedState(_)
            | Self::UnsupportedTransition { .. }
            | Self::ManualConfigRequired { .. } => Some(STATE_FIELD),
            Self::InvalidInput { field, .. } => Some(*field),
            Self::AlreadyRegistered(_) => Some("device.id"),
            _ => None,
        }
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            FaultKind::NotFound => 404,
            FaultKind::InvalidInput => 400,
            FaultKind::Systemic => 500,
        }
    }
}
