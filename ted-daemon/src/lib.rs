//! Standalone host for the TED binding
//!
//! Reads an `openhab.cfg` style service configuration and an items file,
//! wires them into a [`TedBinding`](ted_binding::TedBinding) backed by an
//! in-process [`ItemBus`](item_bus::ItemBus) and prints every update.

pub mod cli;
pub mod config_file;
pub mod items_file;

pub use cli::{Args, Config};
pub use config_file::{load_service_config, parse_service_config};
pub use items_file::{load_item_bindings, parse_item_bindings, ItemBindings, ItemDefinition, RejectedItem};
