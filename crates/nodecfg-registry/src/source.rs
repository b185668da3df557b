//! Collaborator traits the controller depends on.
//!
//! These traits abstract the registry client interface, allowing for
//! in-memory implementations in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use nodecfg_core::{DependencyList, DeviceId, PatternId};

use crate::error::Result;
use crate::types::{Pattern, ServiceDefinition};

/// Identity presented to the registry on every request.
#[derive(Debug, Clone)]
pub struct Requester {
    /// The requesting device.
    pub device_id: DeviceId,
    /// The device's registration token.
    pub token: String,
}

impl Requester {
    /// Create a requester identity.
    #[must_use]
    pub fn new(device_id: DeviceId, token: impl Into<String>) -> Self {
        Self {
            device_id,
            token: token.into(),
        }
    }
}

/// A fully qualified workload version on one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadQuery {
    /// Workload URL.
    pub url: String,
    /// Workload organization.
    pub org: String,
    /// Exact workload version.
    pub version: String,
    /// Node architecture.
    pub arch: String,
}

/// Fetches pattern definitions.
#[async_trait]
pub trait PatternSource: Send + Sync {
    /// Fetch the definition of `pattern`.
    ///
    /// The result is keyed by `org/name`. A well-behaved registry returns
    /// exactly one entry; callers must check.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry request fails.
    async fn get_patterns(
        &self,
        pattern: &PatternId,
        requester: &Requester,
    ) -> Result<HashMap<String, Pattern>>;
}

/// Resolves workload versions to dependency lists.
#[async_trait]
pub trait WorkloadResolver: Send + Sync {
    /// Resolve one workload version to the exact dependency versions it
    /// needs on the queried architecture.
    ///
    /// # Errors
    ///
    /// Returns an error if the workload or one of its dependencies cannot be
    /// resolved.
    async fn resolve_workload(
        &self,
        query: &WorkloadQuery,
        requester: &Requester,
    ) -> Result<DependencyList>;
}

/// Looks up dependency (service) definitions.
#[async_trait]
pub trait ServiceDefinitionSource: Send + Sync {
    /// Find the definition of an exact dependency version.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry request fails.
    async fn get_service_definition(
        &self,
        spec_ref: &str,
        org: &str,
        version: &str,
        arch: &str,
    ) -> Result<Option<ServiceDefinition>>;
}
