//! Binding settings
//!
//! Startup values for the binding. The refresh interval can later be changed
//! at runtime through the `refresh` configuration key.

use std::time::Duration;

/// Default polling period
pub const DEFAULT_REFRESH: Duration = Duration::from_millis(60_000);

/// Settings for a `TedBinding`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSettings {
    /// Interval between two poll cycles
    /// Default: 60 seconds
    pub refresh: Duration,

    /// Connect and read timeout for each gateway request
    /// Default: 5 seconds
    pub http_timeout: Duration,
}

impl Default for BindingSettings {
    fn default() -> Self {
        Self {
            refresh: DEFAULT_REFRESH,
            http_timeout: ted_client::DEFAULT_TIMEOUT,
        }
    }
}

impl BindingSettings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial refresh interval
    pub fn with_refresh(mut self, refresh: Duration) -> Self {
        self.refresh = refresh;
        self
    }

    /// Set the per-request HTTP timeout
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}
