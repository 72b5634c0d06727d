//! The Energy Detective binding
//!
//! Polls one or more TED gateways for their `LiveData.xml` document and posts
//! the values selected by item bindings to an [`EventPublisher`].
//!
//! # Configuration
//!
//! Service configuration is a flat string map:
//!
//! ```text
//! refresh=60000            # poll interval in milliseconds
//! main.host=192.168.1.20   # gateway "main"
//! main.port=80             # optional, defaults to 80
//! ```
//!
//! Items are bound with `<gateway>:<element>(.<element>)*`, for example
//! `main:Power.Total.PowerNow`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use item_bus::{Item, ItemBus};
//! use ted_binding::{GenericBindingProvider, TedBinding};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bus = ItemBus::new();
//! let binding = TedBinding::new(Arc::new(bus.clone()));
//!
//! let provider = Arc::new(GenericBindingProvider::new());
//! provider.process_binding_configuration(
//!     "home.items",
//!     &Item::number("Power_Total"),
//!     "main:Power.Total.PowerNow",
//! )?;
//! binding.add_binding_provider(provider);
//!
//! let config = HashMap::from([("main.host".to_string(), "192.168.1.20".to_string())]);
//! binding.updated(Some(&config))?;
//! binding.activate()?;
//!
//! for update in bus.iter() {
//!     println!("{} = {}", update.item_name, update.value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`EventPublisher`]: item_bus::EventPublisher

pub mod binding;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod poller;
pub mod provider;
pub mod settings;

pub use binding::TedBinding;
pub use config::{parse_configuration, parse_device_key, ParsedConfig};
pub use device::{DeviceConfig, DeviceMap, DeviceRegistry};
pub use dispatcher::process_live_data;
pub use error::{BindingConfigError, BindingError, ConfigurationError};
pub use poller::{PollSummary, SERVICE_NAME};
pub use provider::{
    parse_binding, validate_item_type, BindingProvider, GenericBindingProvider, ItemBinding,
    BINDING_TYPE,
};
pub use settings::BindingSettings;
