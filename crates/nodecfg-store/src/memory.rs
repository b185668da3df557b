//! In-memory storage implementation.
//!
//! Records live for the lifetime of the process. Every operation takes the
//! store lock once, so a `set_config_state` is an exclusive update of the
//! device record.

use chrono::Utc;
use nodecfg_core::DeviceId;
use parking_lot::RwLock;

use crate::error::{Result, StoreError};
use crate::types::{ConfigState, Device, ServiceRecord};
use crate::Store;

#[derive(Debug, Default)]
struct Records {
    device: Option<Device>,
    services: Vec<ServiceRecord>,
}

/// A `Store` backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given device record.
    #[must_use]
    pub fn with_device(device: Device) -> Self {
        Self {
            records: RwLock::new(Records {
                device: Some(device),
                services: Vec::new(),
            }),
        }
    }
}

impl Store for MemoryStore {
    fn get_device(&self) -> Result<Option<Device>> {
        Ok(self.records.read().device.clone())
    }

    fn put_device(&self, device: &Device) -> Result<()> {
        self.records.write().device = Some(device.clone());
        tracing::debug!(device_id = %device.id, "Stored device record");
        Ok(())
    }

    fn set_config_state(&self, device_id: &DeviceId, state: ConfigState) -> Result<Device> {
        let mut records = self.records.write();
        let device = records
            .device
            .as_mut()
            .filter(|d| d.id == *device_id)
            .ok_or(StoreError::NotFound)?;

        device.config_state = state;
        device.updated_at = Utc::now();
        Ok(device.clone())
    }

    fn put_service(&self, service: &ServiceRecord) -> Result<()> {
        let mut records = self.records.write();
        match records.services.iter_mut().find(|s| s.name == service.name) {
            Some(existing) => *existing = service.clone(),
            None => records.services.push(service.clone()),
        }
        Ok(())
    }

    fn find_services(&self, spec_ref: &str, org: &str) -> Result<Vec<ServiceRecord>> {
        Ok(self
            .records
            .read()
            .services
            .iter()
            .filter(|s| s.spec_ref == spec_ref && s.org == org)
            .cloned()
            .collect())
    }

    fn list_services(&self) -> Result<Vec<ServiceRecord>> {
        Ok(self.records.read().services.clone())
    }
}
