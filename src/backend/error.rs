//! Transport error types

use thiserror::Error;

/// Failure talking to the backend. Always recovered locally by the session.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    #[must_use]
    pub fn status(status: u16, body: &str) -> Self {
        Self::new(TransportErrorKind::Status(status), format!("HTTP {status}: {body}"))
    }

    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }
}

/// Error classification, kept for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, reset, DNS
    Network,
    Timeout,
    /// Non-2xx response
    Status(u16),
    /// 2xx response whose body did not match the expected shape
    Decode,
}

impl TransportErrorKind {
    #[must_use]
    pub fn is_server_side(self) -> bool {
        matches!(self, Self::Status(500..=599))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::new(TransportErrorKind::Timeout, format!("Request timeout: {e}"))
        } else if e.is_connect() {
            Self::network(format!("Connection failed: {e}"))
        } else if e.is_decode() {
            Self::decode(format!("Failed to parse response: {e}"))
        } else {
            Self::network(format!("Request failed: {e}"))
        }
    }
}
