//! Error types for the TED client

use thiserror::Error;

/// Errors that can occur while fetching or reading a LiveData document
#[derive(Debug, Error)]
pub enum TedError {
    /// Network or transport failure (connect, timeout, reset)
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The gateway answered with a non-success status code
    #[error("Gateway returned HTTP {0}")]
    Http(u16),

    /// The gateway answered with an empty body
    #[error("Gateway returned an empty response")]
    EmptyResponse,

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// The document root is not `<LiveData>`
    #[error("Unexpected document root <{0}>, expected <LiveData>")]
    UnexpectedRoot(String),
}
