//! Error types for the HTTP layer, version gating and the session protocol.

use thiserror::Error;

/// Failure to deliver a request to the service.
///
/// Everything except [`TransportError::InvalidRequest`] is retried by
/// [`ResilientHttpClient`](crate::http::ResilientHttpClient).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, DNS failure, TLS handshake error.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The connect or request timeout elapsed.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The connection broke while sending or reading the body.
    #[error("I/O error: {0}")]
    Io(String),

    /// The request could not be built (bad URL, bad header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::InvalidRequest(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Io(err.to_string())
        }
    }
}

/// A version string that is not dotted-numeric.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("Malformed version '{version}': component '{component}' is not a number")]
    Malformed { version: String, component: String },
}

/// Errors surfaced by
/// [`ScanSessionClient::start_scan`](crate::session::ScanSessionClient::start_scan).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("Failed to serialize scan event: {0}")]
    Serialize(#[from] serde_json::Error),
}
