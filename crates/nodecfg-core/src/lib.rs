//! Core types and utilities for nodecfg.
//!
//! This crate provides the foundational types used throughout the node
//! configuration-state controller:
//!
//! - **Identifiers**: Strongly-typed IDs for devices and patterns
//! - **Versions**: A total order over dependency version strings
//! - **Dependencies**: Dependency references and the list algebra used to
//!   deduplicate them
//!
//! # Example
//!
//! ```
//! use nodecfg_core::{DependencyList, DependencyRef};
//!
//! let gps_v1 = DependencyRef::new("https://example.com/ms/gps", "myorg", "1.0.0").singleton();
//! let gps_v2 = DependencyRef::new("https://example.com/ms/gps", "myorg", "2.0.0").singleton();
//!
//! let total = DependencyList::from(vec![gps_v1]);
//! let total = total.absorb(&DependencyList::from(vec![gps_v2.clone()]));
//!
//! assert_eq!(total.as_slice(), &[gps_v2]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arch;
pub mod dependency;
pub mod ids;
pub mod version;

pub use arch::{arch_name, node_arch};
pub use dependency::{service_name, DependencyList, DependencyRef, SingletonResolution};
pub use ids::{DeviceId, IdError, PatternId};
pub use version::{compare_versions, Version, VersionError};
