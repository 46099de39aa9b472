//! Error types for the AvaSim environment abstraction.

use crate::types::ObjectId;
use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Backend answered with a non-success status code
    #[error("Backend returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// Backend could not be reached (connection refused, DNS, TLS, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected record shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Scene graph rejected an operation
    #[error("Scene error: {0}")]
    Scene(String),

    /// Referenced scene object does not exist
    #[error("Scene object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// Operation timed out
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl EnvError {
    /// Creates a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a decode error.
    pub fn decode(msg: impl std::fmt::Display) -> Self {
        Self::Decode(msg.to_string())
    }

    /// Creates a scene error.
    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene(msg.into())
    }

    /// Returns true for failures caused by the backend being unavailable
    /// rather than by a malformed response.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Transport(_) | Self::Timeout(_))
    }
}
