//! Courier error types

use thiserror::Error;

/// Errors surfaced by the fallible courier operations
///
/// `Courier::send` never returns these; they are the currency of
/// `create_stream_request` and of internal client construction, where a
/// failure is recovered into a best-effort record.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP error with status code
    #[error("HTTP error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),
    /// Request timeout
    #[error("Request timeout")]
    Timeout,
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(String),
    /// Proxy error
    #[error("Proxy error: {0}")]
    Proxy(String),
    /// Client build error
    #[error("Client build error: {0}")]
    Build(String),
    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Status code recovered from the failure, when the transport produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_connect() {
            Error::Connection(err.to_string())
        } else if err.is_builder() {
            Error::Build(err.to_string())
        } else if let Some(status) = err.status() {
            Error::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Error::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Url(err.to_string())
    }
}
