//! Error types for registry collaborators.

use thiserror::Error;

/// A result type using `RegistryError`.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors returned by registry collaborators.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No workload definition matches the query.
    #[error("workload not found: {url} {org} {version} {arch}")]
    WorkloadNotFound {
        /// Workload URL.
        url: String,
        /// Workload organization.
        org: String,
        /// Requested version.
        version: String,
        /// Requested architecture.
        arch: String,
    },

    /// No service definition satisfies a workload dependency.
    #[error("no version of {spec_ref} {org} at or above {version} for {arch}")]
    NoSatisfyingService {
        /// Dependency URL.
        spec_ref: String,
        /// Dependency organization.
        org: String,
        /// Minimum acceptable version.
        version: String,
        /// Requested architecture.
        arch: String,
    },

    /// The registry could not be reached or refused the request.
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    /// A catalog file could not be read.
    #[error("catalog read failed: {0}")]
    Io(#[from] std::io::Error),

    /// A catalog file could not be parsed.
    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}
