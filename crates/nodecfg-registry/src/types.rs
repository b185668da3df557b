//! Registry definition types.
//!
//! Field names follow the registry's JSON documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A pattern: the set of workloads a node should run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Workloads in declaration order.
    #[serde(default)]
    pub workloads: Vec<WorkloadReference>,
}

/// A workload entry within a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadReference {
    /// URL identifying the workload.
    pub workload_url: String,
    /// Organization that publishes the workload.
    pub workload_org: String,
    /// Hardware architecture this entry targets.
    pub workload_arch: String,
    /// Acceptable versions, preferred first.
    #[serde(default)]
    pub workload_versions: Vec<WorkloadChoice>,
}

/// One acceptable version of a workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadChoice {
    /// Exact workload version.
    pub version: String,
}

impl WorkloadChoice {
    /// Create a choice for the given version.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

/// A published workload version and the dependencies it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadDefinition {
    /// URL identifying the workload.
    pub workload_url: String,
    /// Organization that publishes the workload.
    pub org: String,
    /// Exact version.
    pub version: String,
    /// Hardware architecture.
    pub arch: String,
    /// Dependencies in declaration order.
    #[serde(default)]
    pub dependencies: Vec<WorkloadDependency>,
}

/// A dependency declared by a workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadDependency {
    /// URL identifying the dependency.
    pub spec_ref: String,
    /// Organization that publishes the dependency.
    pub org: String,
    /// Minimum acceptable version.
    pub version: String,
}

/// How a dependency may be shared between workloads on one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sharable {
    /// Only one version may run on a node at a time.
    Exclusive,
    /// One instance shared by every workload.
    #[default]
    Single,
    /// One instance per workload.
    Multiple,
}

/// A published dependency (service) definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// URL identifying the dependency.
    pub spec_ref: String,
    /// Organization that publishes the dependency.
    pub org: String,
    /// Exact version.
    pub version: String,
    /// Hardware architecture.
    pub arch: String,
    /// Sharing mode.
    #[serde(default)]
    pub sharable: Sharable,
    /// Configuration variables the service accepts.
    #[serde(default)]
    pub user_inputs: Vec<UserInput>,
}

impl ServiceDefinition {
    /// Names of the variables that have no default and therefore must be
    /// supplied by the node owner.
    #[must_use]
    pub fn required_inputs(&self) -> Vec<&str> {
        self.user_inputs
            .iter()
            .filter(|input| input.default_value.is_none())
            .map(|input| input.name.as_str())
            .collect()
    }
}

/// A configuration variable accepted by a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    /// Variable name.
    pub name: String,
    /// Variable type, e.g. `string` or `int`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Default value, if the variable may be left unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Everything a [`StaticRegistry`](crate::StaticRegistry) serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Pattern definitions keyed by `org/name`.
    #[serde(default)]
    pub patterns: BTreeMap<String, Pattern>,
    /// Published workload versions.
    #[serde(default)]
    pub workloads: Vec<WorkloadDefinition>,
    /// Published service definitions.
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
}
