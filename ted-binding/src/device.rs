//! Gateway device configuration and registry
//!
//! The registry is read by the poller thread and replaced by reconfiguration
//! calls. Readers take a cheap `Arc` snapshot; writers build a complete new map
//! and swap it in, so a poll cycle never sees a half-applied configuration.
//! Writers are serialized through [`DeviceRegistry::update`], so every update
//! starts from the map the previous one committed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use ted_client::DEFAULT_PORT;

/// Connection details of one gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// User-chosen identifier, the `<id>` part of `<id>.host`
    pub device_id: String,
    /// Host name or IP address, `None` until `<id>.host` is configured
    pub host: Option<String>,
    /// HTTP port, 80 unless `<id>.port` is configured
    pub port: u16,
}

impl DeviceConfig {
    /// Create a device with no host and the default port
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            host: None,
            port: DEFAULT_PORT,
        }
    }

    /// LiveData URL for this device, if a host is configured
    pub fn live_data_url(&self) -> Option<String> {
        self.host
            .as_deref()
            .map(|host| ted_client::live_data_url(host, self.port))
    }
}

impl fmt::Display for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Device [id={}, host={}, port={}]",
            self.device_id,
            self.host.as_deref().unwrap_or("<unset>"),
            self.port
        )
    }
}

/// Snapshot of all configured devices keyed by device id
pub type DeviceMap = HashMap<String, DeviceConfig>;

/// Shared registry of configured gateways
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: RwLock<Arc<DeviceMap>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current registry contents
    ///
    /// The returned map is immutable; later reconfiguration does not affect it.
    pub fn snapshot(&self) -> Arc<DeviceMap> {
        Arc::clone(&self.devices.read())
    }

    /// Look up one device
    pub fn get(&self, device_id: &str) -> Option<DeviceConfig> {
        self.devices.read().get(device_id).cloned()
    }

    /// All devices, ordered by device id
    pub fn devices(&self) -> Vec<DeviceConfig> {
        let snapshot = self.snapshot();
        let mut devices: Vec<DeviceConfig> = snapshot.values().cloned().collect();
        devices.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        devices
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Derive a new map from the current one and swap it in.
    ///
    /// Concurrent updates run one after the other while readers keep
    /// snapshotting the old map. An error from `f` leaves the registry as it was.
    pub(crate) fn update<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnOnce(&DeviceMap) -> Result<DeviceMap, E>,
    {
        let current = self.devices.upgradable_read();
        let next = f(&current)?;
        *RwLockUpgradableReadGuard::upgrade(current) = Arc::new(next);
        Ok(())
    }

    /// Atomically replace the registry contents
    #[cfg(test)]
    pub(crate) fn replace(&self, devices: DeviceMap) {
        *self.devices.write() = Arc::new(devices);
    }
}
