//! Logging setup for hosts of the TED binding
//!
//! The binding itself only emits `tracing` events. A host that does not bring
//! its own subscriber picks a [`LoggingMode`] from a level name and calls
//! [`init_logging`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Output layout of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber, all events are dropped
    Silent,
    /// Compact single-line output
    Development,
    /// Multi-line output with thread names and source locations
    Debug,
}

impl LoggingMode {
    /// Layout suited to a level name
    ///
    /// `off` is silent, `debug` and `trace` get the verbose layout and every
    /// other level the compact one.
    pub fn for_level(level: &str) -> Self {
        match level.to_ascii_lowercase().as_str() {
            "off" => LoggingMode::Silent,
            "debug" | "trace" => LoggingMode::Debug,
            _ => LoggingMode::Development,
        }
    }
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Install a global subscriber for `mode`, filtering at `level`.
///
/// `RUST_LOG` replaces `level` when it is set.
pub fn init_logging(mode: LoggingMode, level: &str) -> Result<(), LoggingError> {
    let filter = env_filter(std::env::var("RUST_LOG").ok().as_deref(), level);

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => Registry::default()
            .with(fmt::layer().with_target(false).compact())
            .with(filter)
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .pretty()
                    .with_thread_names(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
    }
}

fn env_filter(rust_log: Option<&str>, level: &str) -> EnvFilter {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new(level),
    }
}
