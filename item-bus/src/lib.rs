//! Item model and in-process item/event bus
//!
//! The TED binding publishes decimal state updates for named items. This
//! crate provides the pieces a host needs to receive them:
//!
//! - [`Item`] / [`ItemType`]: the declared items a binding may be attached to
//! - [`EventPublisher`]: the trait a binding posts updates through
//! - [`ItemBus`]: an in-process publisher with blocking update iteration
//!
//! # Quick Start
//!
//! ```rust
//! use item_bus::{EventPublisher, ItemBus};
//! use std::time::Duration;
//!
//! let bus = ItemBus::new();
//! bus.post_update("Power_Total", 1500).unwrap();
//!
//! if let Some(update) = bus.iter().recv_timeout(Duration::from_secs(1)) {
//!     println!("{} = {}", update.item_name, update.value);
//! }
//! ```

pub mod bus;
pub mod error;
pub mod event;
pub mod item;
pub mod iter;

pub use bus::{EventPublisher, ItemBus};
pub use error::{PublishError, UnknownItemType};
pub use event::ItemUpdate;
pub use item::{Item, ItemType};
pub use iter::{TryIter, UpdateIterator};
