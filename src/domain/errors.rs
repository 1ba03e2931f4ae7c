//! Failure reasons reported by remote collaborators
//!
//! `Result<T, FetchError>` is the explicit success/failure type of every
//! remote call. Only the resilient request layer turns a failure into an
//! empty result.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("Connection failed: {url} - {message}")]
    Connection { url: String, message: String },

    #[error("HTTP request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl FetchError {
    pub fn connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Short machine-friendly kind, used as a structured log field.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Connection { .. } => "connection",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
            Self::InvalidRequest { .. } => "invalid_request",
        }
    }
}
