// src/utils/errors.rs
//! Error types for the interception layer
//!
//! Every error here is recoverable by design: a configuration problem
//! disables interception for the process lifetime, and a rewrite problem
//! surfaces through the call's own error channel. Nothing in this crate
//! may terminate the monitored process.

use thiserror::Error;

/// Main error type for the interception layer
#[derive(Error, Debug)]
pub enum InterceptError {
    /// Missing or malformed configuration (relay address, required variables)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential string does not match `<prefix>_<org>_agent_<id>`
    #[error("Malformed credential: {0}")]
    Credential(String),

    /// Rebuilding the request head for relay delivery failed
    #[error("Rewrite failed: {0}")]
    Rewrite(String),
}

impl InterceptError {
    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a new credential error.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential(message.into())
    }

    /// Creates a new rewrite error.
    pub fn rewrite(message: impl Into<String>) -> Self {
        Self::Rewrite(message.into())
    }
}

/// Result type alias using InterceptError.
pub type Result<T> = std::result::Result<T, InterceptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InterceptError::config("BLOOM_RELAY_URL is not a valid URL");
        assert!(err.to_string().contains("BLOOM_RELAY_URL"));

        let err = InterceptError::credential("missing _agent_ segment");
        assert!(err.to_string().contains("_agent_"));
    }
}
