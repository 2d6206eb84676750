//! Error types for the DHL Parcel client.
//!
//! Every operation either succeeds with a decoded value or fails with exactly
//! one [`DhlError`]. Nothing is retried here except the single token refresh
//! performed by the authenticated transport after a 401.

use std::fmt;
use thiserror::Error;

/// Result type alias for DHL Parcel operations.
pub type DhlResult<T> = Result<T, DhlError>;

/// Kind of network-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The per-call timeout elapsed.
    Timeout,
    /// The connection could not be established or was reset.
    Connection,
    /// Any other failure while sending the request or reading the response.
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Connection => write!(f, "connection"),
            TransportErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Error type for DHL Parcel client operations.
#[derive(Debug, Error)]
pub enum DhlError {
    /// Configuration error (invalid base URL, timeout, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Token acquisition failed at the authentication endpoint.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message.
        message: String,
        /// HTTP status returned by the authentication endpoint.
        status: Option<u16>,
        /// Raw response body.
        body: Option<String>,
    },

    /// Network or timeout failure.
    #[error("Transport error ({kind}): {message}")]
    Transport {
        /// What went wrong on the wire.
        kind: TransportErrorKind,
        /// Error message.
        message: String,
    },

    /// The API answered with a status outside `[200, 300)`.
    #[error("{message}")]
    Api {
        /// The operation that failed.
        operation: &'static str,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: Option<u16>,
        /// Raw response body.
        body: Option<String>,
    },

    /// The API answered with a 2xx status but the body was not valid JSON.
    #[error("Could not decode {operation} response: {message}")]
    Decode {
        /// The operation that failed.
        operation: &'static str,
        /// Error message from the decoder.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// A call argument was rejected before the request was built.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Logical parameter name.
        name: &'static str,
        /// Why it was rejected.
        message: String,
    },

    /// A caller-supplied request body could not be serialized.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl DhlError {
    /// Returns the upstream HTTP status, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DhlError::Authentication { status, .. } | DhlError::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns the raw upstream response body, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            DhlError::Authentication { body, .. } | DhlError::Api { body, .. } => body.as_deref(),
            DhlError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true for business-level failures: non-2xx responses and
    /// undecodable 2xx responses.
    pub fn is_api_error(&self) -> bool {
        matches!(self, DhlError::Api { .. } | DhlError::Decode { .. })
    }

    /// Returns true if the per-call timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            DhlError::Transport {
                kind: TransportErrorKind::Timeout,
                ..
            }
        )
    }

    /// Creates an API error for a non-2xx response.
    pub fn api(operation: &'static str, description: &str, status: u16, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body).into_owned();
        DhlError::Api {
            operation,
            message: format!(
                "Could not {} due to API server error (HTTP {}): {}",
                description, status, body
            ),
            status: Some(status),
            body: Some(body),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        DhlError::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for DhlError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connection
        } else {
            TransportErrorKind::Other
        };

        DhlError::Transport {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for DhlError {
    fn from(err: url::ParseError) -> Self {
        DhlError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
