//! Automatic provisioning of resolved dependencies.
//!
//! Each dependency is handed to a [`ServiceProvisioner`], whose answer is one
//! of four [`ProvisionOutcome`]s. Created and already-present outcomes let the
//! pass continue; the first needs-manual-config or failed outcome stops it.
//! Services created before the stop are kept.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use nodecfg_core::{DependencyList, DependencyRef};
use nodecfg_registry::ServiceDefinitionSource;
use nodecfg_store::{ServiceRecord, Store};

use crate::error::{ControlError, Result};
use crate::types::PolicyCreated;

/// Everything a provisioner needs to create a local service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    /// Dependency URL.
    pub spec_ref: String,
    /// Dependency organization.
    pub org: String,
    /// Derived service name.
    pub name: String,
    /// Version to provision.
    pub version: String,
    /// Architecture to provision for.
    pub arch: String,
    /// Whether only one version of this dependency may run on the node.
    pub exclusive: bool,
}

impl ServiceSpec {
    /// Build the spec for a resolved dependency. A dependency without an
    /// architecture is provisioned for `node_arch`.
    #[must_use]
    pub fn for_dependency(dep: &DependencyRef, node_arch: &str) -> Self {
        let arch = if dep.arch.is_empty() {
            node_arch.to_string()
        } else {
            dep.arch.clone()
        };

        Self {
            spec_ref: dep.spec_ref.clone(),
            org: dep.org.clone(),
            name: dep.service_name(),
            version: dep.version.clone(),
            arch,
            exclusive: dep.exclusive,
        }
    }
}

/// The result of one provisioning attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A new service was created.
    Created(PolicyCreated),
    /// A service for this dependency already exists.
    AlreadyPresent,
    /// The dependency has variables that cannot be filled in automatically.
    NeedsManualConfig(String),
    /// Any other failure.
    Failed(String),
}

/// Creates local services for dependencies.
#[async_trait]
pub trait ServiceProvisioner: Send + Sync {
    /// Attempt to create the service described by `spec`.
    async fn create_service(&self, spec: &ServiceSpec) -> ProvisionOutcome;
}

/// Provision every dependency in `deps`, in order.
///
/// Returns the notifications for the services created.
///
/// # Errors
///
/// Returns `ControlError::ManualConfigRequired` for the first dependency that
/// needs manual configuration and `ControlError::Provisioning` for the first
/// unexpected failure. Dependencies after it are not attempted.
pub async fn provision_all<P: ServiceProvisioner + ?Sized>(
    provisioner: &P,
    deps: &DependencyList,
    node_arch: &str,
) -> Result<Vec<PolicyCreated>> {
    let mut created = Vec::new();

    for dep in deps {
        let spec = ServiceSpec::for_dependency(dep, node_arch);

        match provisioner.create_service(&spec).await {
            ProvisionOutcome::Created(msg) => {
                tracing::debug!(service = %spec.name, "Autoconfig created service");
                created.push(msg);
            }
            ProvisionOutcome::AlreadyPresent => {
                // The node owner may configure dependencies before asking for
                // the configured state.
                tracing::debug!(service = %spec.name, "Service already present");
            }
            ProvisionOutcome::NeedsManualConfig(reason) => {
                tracing::warn!(service = %spec.name, reason = %reason, "Dependency needs manual configuration");
                return Err(ControlError::ManualConfigRequired {
                    spec_ref: spec.spec_ref,
                    org: spec.org,
                    version: spec.version,
                    reason,
                });
            }
            ProvisionOutcome::Failed(detail) => {
                tracing::error!(service = %spec.name, detail = %detail, "Service creation failed");
                return Err(ControlError::Provisioning {
                    service: spec.name,
                    detail,
                });
            }
        }
    }

    Ok(created)
}

/// A provisioner that records services in the node's store.
///
/// Variables without defaults must be supplied by the node owner, so a
/// definition that declares any makes the dependency need manual
/// configuration.
///
/// A singleton dependency is already present if a service exists for it at
/// any version. Other dependencies may run side by side at several versions,
/// so only a service at the exact version counts.
pub struct StoreProvisioner<S: Store, D: ServiceDefinitionSource> {
    store: Arc<S>,
    definitions: Arc<D>,
}

impl<S: Store, D: ServiceDefinitionSource> StoreProvisioner<S, D> {
    /// Create a provisioner over `store`, looking definitions up in
    /// `definitions`.
    #[must_use]
    pub fn new(store: Arc<S>, definitions: Arc<D>) -> Self {
        Self { store, definitions }
    }
}

#[async_trait]
impl<S, D> ServiceProvisioner for StoreProvisioner<S, D>
where
    S: Store + 'static,
    D: ServiceDefinitionSource + 'static,
{
    async fn create_service(&self, spec: &ServiceSpec) -> ProvisionOutcome {
        let existing = self
            .store
            .find_services(&spec.spec_ref, &spec.org)
            .map(|services| {
                services
                    .into_iter()
                    .find(|s| spec.exclusive || s.version == spec.version)
            });

        match existing {
            Ok(Some(existing)) => {
                tracing::debug!(
                    service = %spec.name,
                    existing = %existing.name,
                    "Dependency already provisioned"
                );
                return ProvisionOutcome::AlreadyPresent;
            }
            Ok(None) => {}
            Err(e) => return ProvisionOutcome::Failed(format!("unable to read services: {e}")),
        }

        let definition = match self
            .definitions
            .get_service_definition(&spec.spec_ref, &spec.org, &spec.version, &spec.arch)
            .await
        {
            Ok(Some(def)) => def,
            Ok(None) => {
                return ProvisionOutcome::Failed(format!(
                    "no definition for {} {} {} {}",
                    spec.spec_ref, spec.org, spec.version, spec.arch
                ))
            }
            Err(e) => return ProvisionOutcome::Failed(format!("unable to read definition: {e}")),
        };

        let required = definition.required_inputs();
        if !required.is_empty() {
            return ProvisionOutcome::NeedsManualConfig(format!(
                "variables {} must be configured",
                required.join(", ")
            ));
        }

        let variables: BTreeMap<String, String> = definition
            .user_inputs
            .iter()
            .filter_map(|input| {
                input
                    .default_value
                    .as_ref()
                    .map(|value| (input.name.clone(), value.clone()))
            })
            .collect();

        let now = Utc::now();
        let record = ServiceRecord {
            name: spec.name.clone(),
            spec_ref: spec.spec_ref.clone(),
            org: spec.org.clone(),
            version: spec.version.clone(),
            arch: spec.arch.clone(),
            variables,
            created_at: now,
        };

        if let Err(e) = self.store.put_service(&record) {
            return ProvisionOutcome::Failed(format!("unable to save service: {e}"));
        }

        ProvisionOutcome::Created(PolicyCreated {
            service_name: record.name,
            spec_ref: record.spec_ref,
            org: record.org,
            version: record.version,
            created_at: now,
        })
    }
}
