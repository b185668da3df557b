//! Configuration-state controller for nodecfg nodes.
//!
//! This crate drives a node through its two-state lifecycle and, when the
//! node becomes configured, resolves its pattern into the dependencies the
//! node must run and provisions the ones that are missing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       HTTP (axum)                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ConfigStateService                       │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐   │
//! │  │  Lifecycle  │ │   Pattern   │ │   Auto-provisioner  │   │
//! │  │  validator  │ │   resolver  │ │                     │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┼──────────────┐
//!               ▼              ▼              ▼
//!        ┌──────────┐   ┌──────────┐   ┌─────────────┐
//!        │  Store   │   │ Registry │   │ Provisioner │
//!        └──────────┘   └──────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use nodecfg_control::{
//!     ConfigStateRequest, ConfigStateService, NodeControl, RegisterDeviceRequest,
//!     StoreProvisioner,
//! };
//! use nodecfg_registry::StaticRegistry;
//! use nodecfg_store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let registry = Arc::new(StaticRegistry::from_file("/etc/nodecfg/catalog.json")?);
//! let provisioner = Arc::new(StoreProvisioner::new(Arc::clone(&store), Arc::clone(&registry)));
//! let control = ConfigStateService::with_defaults(store, registry, provisioner);
//!
//! control
//!     .register_device(RegisterDeviceRequest {
//!         id: "an12345".into(),
//!         organization: "myorg".into(),
//!         token: "abcdefg".into(),
//!         pattern: Some("netspeed".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let update = control
//!     .update_config_state(ConfigStateRequest::new("configured"))
//!     .await?;
//! println!("created {} services", update.policies_created.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod provision;
pub mod resolver;
pub mod service;
pub mod types;

pub use config::NodeConfig;
pub use error::{ControlError, FaultKind, Result};
pub use provision::{ProvisionOutcome, ServiceProvisioner, ServiceSpec, StoreProvisioner};
pub use service::{ConfigStateService, NodeControl};
pub use types::{
    ConfigStateRequest, ConfigStateUpdate, ConfigStateView, ControlConfig, PolicyCreated,
    RegisterDeviceRequest,
};

// Re-export commonly used types from dependencies for convenience
pub use nodecfg_core::{DependencyList, DependencyRef, DeviceId, PatternId};
pub use nodecfg_store::{ConfigState, Device};
