// SPDX-FileCopyrightText: 2026 Leadwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Leadwire chat front-end.

use thiserror::Error;

/// The primary error type used across all Leadwire adapter traits and core operations.
#[derive(Debug, Error)]
pub enum LeadwireError {
    /// Configuration errors (invalid TOML, missing credentials, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging relay errors (unreachable relay, non-2xx status, malformed body).
    #[error("relay error: {message}")]
    Relay {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generative responder errors (API failure, empty completion).
    #[error("responder error: {message}")]
    Responder {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Requested adapter was not configured.
    #[error("adapter not found: {adapter_type}/{name}")]
    AdapterNotFound { adapter_type: String, name: String },

    /// Adapter health check failed.
    #[error("health check failed for {name}: {source}")]
    HealthCheckFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadwireError {
    /// Shorthand for a relay error without an underlying source.
    pub fn relay(message: impl Into<String>) -> Self {
        Self::Relay {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a responder error without an underlying source.
    pub fn responder(message: impl Into<String>) -> Self {
        Self::Responder {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for errors caused by a remote collaborator being
    /// unreachable or slow, as opposed to a local defect.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Relay { .. } | Self::Responder { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_shorthand_formats_message() {
        let err = LeadwireError::relay("receiveNotification returned 502");
        assert_eq!(err.to_string(), "relay error: receiveNotification returned 502");
        assert!(err.is_transient());
    }

    #[test]
    fn config_errors_are_not_transient() {
        assert!(!LeadwireError::Config("missing token".into()).is_transient());
        assert!(!LeadwireError::Internal("bug".into()).is_transient());
    }

    #[test]
    fn timeout_formats_duration() {
        let err = LeadwireError::Timeout {
            duration: std::time::Duration::from_secs(15),
        };
        assert_eq!(err.to_string(), "operation timed out after 15s");
        assert!(err.is_transient());
    }
}
