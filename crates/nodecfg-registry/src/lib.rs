//! Registry collaborators for nodecfg.
//!
//! The controller never talks to a registry directly. It depends on three
//! narrow traits:
//!
//! - [`PatternSource`]: fetch a pattern definition by `org/name`
//! - [`WorkloadResolver`]: resolve one workload version to the dependencies
//!   it needs on a given architecture
//! - [`ServiceDefinitionSource`]: look up the definition of a dependency,
//!   including the configuration variables it expects
//!
//! [`StaticRegistry`] implements all three over an in-memory [`Catalog`],
//! which can be loaded from a JSON file.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod source;
pub mod static_registry;
pub mod types;

pub use error::{RegistryError, Result};
pub use source::{PatternSource, Requester, ServiceDefinitionSource, WorkloadQuery, WorkloadResolver};
pub use static_registry::StaticRegistry;
pub use types::{
    Catalog, Pattern, Sharable, ServiceDefinition, UserInput, WorkloadChoice, WorkloadDefinition,
    WorkloadDependency, WorkloadReference,
};
