//! Private HTTP client for The Energy Detective gateways
//!
//! This crate fetches the gateway's `/api/LiveData.xml` document with a
//! blocking GET and exposes it as a parsed [`LiveData`] tree that can be
//! queried by element path.

mod error;
pub mod live_data;

pub use error::TedError;
pub use live_data::{find_element, text_content, LiveData, LIVE_DATA_ROOT};

use std::time::Duration;

/// Path of the live telemetry document on the gateway
pub const LIVE_DATA_PATH: &str = "/api/LiveData.xml";

/// Port the gateway's web server listens on unless configured otherwise
pub const DEFAULT_PORT: u16 = 80;

/// Connect and read timeout applied to every request unless overridden
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Build the LiveData URL for a gateway.
///
/// The port is only written out when it differs from [`DEFAULT_PORT`].
pub fn live_data_url(host: &str, port: u16) -> String {
    if port == DEFAULT_PORT {
        format!("http://{}{}", host, LIVE_DATA_PATH)
    } else {
        format!("http://{}:{}{}", host, port, LIVE_DATA_PATH)
    }
}

/// A minimal blocking client for TED gateways
#[derive(Debug, Clone)]
pub struct TedClient {
    agent: ureq::Agent,
}

impl TedClient {
    /// Create a new client with the default 5 second timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom connect/read timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(timeout)
                .timeout_read(timeout)
                .build(),
        }
    }

    /// Fetch the raw LiveData XML body from a gateway
    ///
    /// # Arguments
    /// * `host` - Gateway host name or IP address
    /// * `port` - Gateway HTTP port (typically 80)
    pub fn fetch_live_data(&self, host: &str, port: u16) -> Result<String, TedError> {
        let url = live_data_url(host, port);
        tracing::debug!(%url, "GET LiveData");

        let response = self.agent.get(&url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => TedError::Http(code),
            ureq::Error::Transport(t) => TedError::Network(t.to_string()),
        })?;

        let body = response
            .into_string()
            .map_err(|e| TedError::Network(e.to_string()))?;

        if body.trim().is_empty() {
            return Err(TedError::EmptyResponse);
        }

        Ok(body)
    }

    /// Fetch and parse the LiveData document from a gateway
    pub fn live_data(&self, host: &str, port: u16) -> Result<LiveData, TedError> {
        let body = self.fetch_live_data(host, port)?;
        LiveData::parse(&body)
    }
}

impl Default for TedClient {
    fn default() -> Self {
        Self::new()
    }
}
