//! Storage layer for nodecfg.
//!
//! This crate defines the [`Store`] trait through which the controller reads
//! the node's device registration and records provisioned services, plus an
//! in-memory implementation used by the daemon and by tests.
//!
//! A node holds at most one device record. Serializing concurrent updates to
//! that record is the store's job; the controller takes no locks of its own.
//!
//! # Example
//!
//! ```
//! use nodecfg_store::{ConfigState, Device, MemoryStore, Store};
//! use nodecfg_core::DeviceId;
//!
//! let store = MemoryStore::new();
//! let device = Device::new(DeviceId::new("an12345").unwrap(), "myorg", "token");
//! store.put_device(&device).unwrap();
//!
//! let updated = store.set_config_state(&device.id, ConfigState::Configured).unwrap();
//! assert_eq!(updated.config_state, ConfigState::Configured);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use types::{ConfigState, Device, ServiceRecord};

use nodecfg_core::DeviceId;

/// The storage trait defining all record operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (durable backends, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Device Operations
    // =========================================================================

    /// Get the device registered on this node, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get_device(&self) -> Result<Option<Device>>;

    /// Insert or replace the device record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put_device(&self, device: &Device) -> Result<()>;

    /// Update the configuration state of the device and return the updated
    /// record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no device with this ID is recorded.
    fn set_config_state(&self, device_id: &DeviceId, state: ConfigState) -> Result<Device>;

    // =========================================================================
    // Service Operations
    // =========================================================================

    /// Insert or replace a service record, keyed by its name.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put_service(&self, service: &ServiceRecord) -> Result<()>;

    /// Find every service provisioned for a dependency, at any version, in
    /// insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn find_services(&self, spec_ref: &str, org: &str) -> Result<Vec<ServiceRecord>>;

    /// List all provisioned services in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn list_services(&self) -> Result<Vec<ServiceRecord>>;
}
