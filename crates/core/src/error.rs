//! Unified error types for the honeypot pipeline.
//!
//! The taxonomy mirrors how failures are handled:
//! - `Config` aborts process startup
//! - `Decode` fails a single message, the subscriber loop continues
//! - `Queue`/`Store` suppress the ack so the delivery system redelivers
//! - `Service`/`Verdict` fail a single sweep item, the sweep continues

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the honeypot pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing or unusable. Fatal at startup.
    #[error("missing configuration: {0}")]
    Config(String),

    /// A delivered message payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Message subscription failure (connect, fetch, commit).
    #[error("queue error: {0}")]
    Queue(String),

    /// Store read or write failure.
    #[error("store error: {0}")]
    Store(String),

    /// An external enrichment service call failed.
    #[error("{service} request failed: {message}")]
    Service {
        service: &'static str,
        message: String,
    },

    /// Inference output violated the verdict schema.
    #[error("invalid verdict: {0}")]
    Verdict(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn queue(msg: impl Into<String>) -> Self {
        Self::Queue(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn service(service: &'static str, msg: impl Into<String>) -> Self {
        Self::Service {
            service,
            message: msg.into(),
        }
    }

    pub fn verdict(msg: impl Into<String>) -> Self {
        Self::Verdict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error should abort the owning process rather than be
    /// absorbed at a per-item boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
