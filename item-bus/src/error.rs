//! Error types for the item bus

use thiserror::Error;

/// Errors that can occur when posting an update
#[derive(Debug, Error)]
pub enum PublishError {
    /// The receiving side of the bus has gone away
    #[error("Item bus is closed, update for '{0}' dropped")]
    Closed(String),
}

/// An item type name that is not part of the item model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown item type '{0}'")]
pub struct UnknownItemType(pub String);
