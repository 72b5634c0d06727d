//! Error types for the TED binding

use item_bus::ItemType;
use thiserror::Error;

/// Errors raised while applying service configuration
///
/// Any of these aborts the whole reconfiguration call; nothing from that call
/// is committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A numeric setting (`refresh` or `<id>.port`) could not be parsed
    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidNumber {
        key: String,
        value: String,
        reason: String,
    },

    /// A device key matched the key pattern but names an unknown setting
    #[error("the given configKey '{0}' is unknown")]
    UnknownKey(String),
}

/// Errors raised while registering a single item binding
///
/// These reject only the offending item; other items keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingConfigError {
    /// The bound item does not accept decimal states
    #[error(
        "item '{item}' is of type '{item_type}', only Number items are allowed - please check your *.items configuration"
    )]
    UnsupportedItemType { item: String, item_type: ItemType },

    /// The binding string does not follow `gateway:element(.element)*`
    #[error("{0}")]
    Syntax(String),
}

/// Errors raised by binding lifecycle operations
#[derive(Debug, Error)]
pub enum BindingError {
    /// The background poller thread could not be started
    #[error("Failed to spawn poller thread: {0}")]
    Spawn(#[from] std::io::Error),
}
