//! TedBinding - main entry point of the binding
//!
//! Owns the device registry, the attached binding providers and the poller
//! thread. The host drives it explicitly:
//!
//! 1. `TedBinding::new(publisher)` with the host's event publisher
//! 2. `add_binding_provider(..)` for each source of item bindings
//! 3. `updated(Some(&config))` with the service configuration
//! 4. `activate()` to start polling, `deactivate()` (or drop) to stop

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use item_bus::EventPublisher;
use parking_lot::Mutex;

use crate::config::parse_configuration;
use crate::device::DeviceConfig;
use crate::error::{BindingError, ConfigurationError};
use crate::poller::{PollContext, PollSummary, Poller};
use crate::provider::BindingProvider;
use crate::settings::BindingSettings;

/// Actively polling TED binding
///
/// # Example
///
/// ```rust,ignore
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use item_bus::{Item, ItemBus};
/// use ted_binding::{GenericBindingProvider, TedBinding};
///
/// let bus = ItemBus::new();
/// let binding = TedBinding::new(Arc::new(bus.clone()));
///
/// let provider = Arc::new(GenericBindingProvider::new());
/// provider.process_binding_configuration("home.items", &Item::number("Power"), "main:Power.Total.PowerNow")?;
/// binding.add_binding_provider(provider);
///
/// let config = HashMap::from([("main.host".to_string(), "192.168.1.20".to_string())]);
/// binding.updated(Some(&config))?;
/// binding.activate()?;
///
/// for update in bus.iter() {
///     println!("{} = {}", update.item_name, update.value);
/// }
/// ```
pub struct TedBinding {
    context: Arc<PollContext>,
    poller: Mutex<Option<Poller>>,
    properly_configured: AtomicBool,
}

impl TedBinding {
    /// Create a binding with default settings
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self::with_settings(publisher, BindingSettings::default())
    }

    /// Create a binding with custom settings
    pub fn with_settings(publisher: Arc<dyn EventPublisher>, settings: BindingSettings) -> Self {
        Self {
            context: Arc::new(PollContext::new(publisher, &settings)),
            poller: Mutex::new(None),
            properly_configured: AtomicBool::new(false),
        }
    }

    /// Attach a source of item bindings
    pub fn add_binding_provider(&self, provider: Arc<dyn BindingProvider>) {
        self.context.add_provider(provider);
    }

    /// Detach a previously attached provider
    pub fn remove_binding_provider(&self, provider: &Arc<dyn BindingProvider>) {
        self.context.remove_provider(provider);
    }

    /// Start the poller thread. Calling this on an active binding is a no-op.
    pub fn activate(&self) -> Result<(), BindingError> {
        let mut poller = self.poller.lock();
        if poller.is_none() {
            *poller = Some(Poller::spawn(Arc::clone(&self.context))?);
        }
        self.properly_configured.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Stop the poller thread, waiting for a running cycle to finish
    pub fn deactivate(&self) {
        if let Some(poller) = self.poller.lock().take() {
            poller.shutdown();
        }
    }

    /// Whether the poller thread is running
    pub fn is_active(&self) -> bool {
        self.poller.lock().is_some()
    }

    /// Whether the binding has been activated or successfully configured
    pub fn is_properly_configured(&self) -> bool {
        self.properly_configured.load(Ordering::Relaxed)
    }

    /// Apply a service configuration map.
    ///
    /// `None` leaves the binding unchanged. Devices accumulate across calls;
    /// a failed call leaves the previous refresh interval and devices in place.
    pub fn updated(&self, config: Option<&HashMap<String, String>>) -> Result<(), ConfigurationError> {
        tracing::debug!("updated() is called!");

        let Some(config) = config else {
            return Ok(());
        };

        // Refresh is committed under the registry's update guard
        self.context.registry.update(|current| {
            let parsed = parse_configuration(config, current)?;

            if let Some(refresh) = parsed.refresh {
                self.context.set_refresh(refresh);
            }
            for device in parsed.devices.values() {
                tracing::debug!("configured {}", device);
            }
            Ok::<_, ConfigurationError>(parsed.devices)
        })?;

        self.properly_configured.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Current refresh interval
    pub fn refresh_interval(&self) -> Duration {
        self.context.refresh()
    }

    /// All configured devices, ordered by device id
    pub fn devices(&self) -> Vec<DeviceConfig> {
        self.context.registry.devices()
    }

    /// One configured device
    pub fn device(&self, device_id: &str) -> Option<DeviceConfig> {
        self.context.registry.get(device_id)
    }

    /// Run one poll cycle on the calling thread
    pub fn execute(&self) -> PollSummary {
        self.context.execute()
    }

    /// Ask an active poller to run a cycle now
    pub fn poll_now(&self) {
        if let Some(poller) = self.poller.lock().as_ref() {
            poller.poll_now();
        }
    }
}

impl Drop for TedBinding {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl std::fmt::Debug for TedBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TedBinding")
            .field("context", &self.context)
            .field("active", &self.is_active())
            .finish()
    }
}
