//! In-memory registry serving a fixed catalog.
//!
//! Workload dependencies name a minimum version; resolution picks the highest
//! published service definition at or above it for the queried architecture.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use nodecfg_core::{compare_versions, DependencyList, DependencyRef, PatternId};
use parking_lot::RwLock;

use crate::error::{RegistryError, Result};
use crate::source::{PatternSource, Requester, ServiceDefinitionSource, WorkloadQuery, WorkloadResolver};
use crate::types::{Catalog, Pattern, ServiceDefinition, Sharable, WorkloadDefinition};

/// A registry backed by an in-memory [`Catalog`].
#[derive(Debug, Default)]
pub struct StaticRegistry {
    catalog: RwLock<Catalog>,
}

impl StaticRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry serving `catalog`.
    #[must_use]
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let catalog: Catalog = serde_json::from_str(&data)?;
        tracing::info!(
            path = %path.as_ref().display(),
            patterns = catalog.patterns.len(),
            workloads = catalog.workloads.len(),
            services = catalog.services.len(),
            "Loaded registry catalog"
        );
        Ok(Self::from_catalog(catalog))
    }

    /// Publish a pattern under `key`.
    ///
    /// The key is normally `org/name`; any string is accepted.
    pub fn insert_pattern(&self, key: impl Into<String>, pattern: Pattern) {
        self.catalog.write().patterns.insert(key.into(), pattern);
    }

    /// Publish a workload version.
    pub fn insert_workload(&self, workload: WorkloadDefinition) {
        self.catalog.write().workloads.push(workload);
    }

    /// Publish a service definition.
    pub fn insert_service(&self, service: ServiceDefinition) {
        self.catalog.write().services.push(service);
    }

    fn highest_satisfying(
        services: &[ServiceDefinition],
        spec_ref: &str,
        org: &str,
        min_version: &str,
        arch: &str,
    ) -> Option<ServiceDefinition> {
        services
            .iter()
            .filter(|s| s.spec_ref == spec_ref && s.org == org && s.arch == arch)
            .filter(|s| compare_versions(&s.version, min_version) != Ordering::Less)
            .max_by(|a, b| compare_versions(&a.version, &b.version))
            .cloned()
    }
}

#[async_trait]
impl PatternSource for StaticRegistry {
    async fn get_patterns(
        &self,
        pattern: &PatternId,
        requester: &Requester,
    ) -> Result<HashMap<String, Pattern>> {
        let key = pattern.key();
        tracing::debug!(pattern = %key, device_id = %requester.device_id, "Serving pattern");

        Ok(self
            .catalog
            .read()
            .patterns
            .get(&key)
            .map(|p| HashMap::from([(key.clone(), p.clone())]))
            .unwrap_or_default())
    }
}

#[async_trait]
impl WorkloadResolver for StaticRegistry {
    async fn resolve_workload(
        &self,
        query: &WorkloadQuery,
        requester: &Requester,
    ) -> Result<DependencyList> {
        let catalog = self.catalog.read();

        let workload = catalog
            .workloads
            .iter()
            .find(|w| {
                w.workload_url == query.url
                    && w.org == query.org
                    && w.version == query.version
                    && w.arch == query.arch
            })
            .ok_or_else(|| RegistryError::WorkloadNotFound {
                url: query.url.clone(),
                org: query.org.clone(),
                version: query.version.clone(),
                arch: query.arch.clone(),
            })?;

        let resolved = workload
            .dependencies
            .iter()
            .map(|dep| -> Result<DependencyRef> {
                let def = Self::highest_satisfying(
                    &catalog.services,
                    &dep.spec_ref,
                    &dep.org,
                    &dep.version,
                    &query.arch,
                )
                .ok_or_else(|| RegistryError::NoSatisfyingService {
                    spec_ref: dep.spec_ref.clone(),
                    org: dep.org.clone(),
                    version: dep.version.clone(),
                    arch: query.arch.clone(),
                })?;

                Ok(DependencyRef {
                    spec_ref: def.spec_ref,
                    org: def.org,
                    version: def.version,
                    arch: def.arch,
                    exclusive: def.sharable == Sharable::Exclusive,
                })
            })
            .collect::<Result<DependencyList>>()?;

        tracing::debug!(
            workload = %query.url,
            version = %query.version,
            device_id = %requester.device_id,
            dependencies = resolved.len(),
            "Resolved workload"
        );

        Ok(resolved)
    }
}

#[async_trait]
impl ServiceDefinitionSource for StaticRegistry {
    async fn get_service_definition(
        &self,
        spec_ref: &str,
        org: &str,
        version: &str,
        arch: &str,
    ) -> Result<Option<ServiceDefinition>> {
        Ok(self
            .catalog
            .read()
            .services
            .iter()
            .find(|s| s.spec_ref == spec_ref && s.org == org && s.version == version && s.arch == arch)
            .cloned())
    }
}
