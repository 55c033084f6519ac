//! Error types for zonekv
//!
//! This module defines the common error types used throughout the system.

use crate::store_name::StoreNameError;
use thiserror::Error;

/// Common result type for zonekv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for zonekv
#[derive(Debug, Error)]
pub enum Error {
    // Caller errors
    #[error("illegal system store name: {0}")]
    IllegalStoreName(#[from] StoreNameError),

    #[error("invalid bootstrap URL: {0}")]
    InvalidBootstrapUrl(String),

    // Topology errors
    #[error("malformed cluster topology: {0}")]
    Parse(String),

    // Bootstrap errors
    #[error("all bootstrap seeds exhausted after {attempts} attempts")]
    BootstrapExhausted { attempts: usize },

    // Per-node transport errors
    #[error("endpoint {endpoint} unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },

    #[error("request timeout")]
    Timeout,

    // Store-level errors
    #[error("store {store} unavailable after {attempts} attempts")]
    StoreUnavailable { store: String, attempts: usize },

    #[error("version conflict writing key {key:?}")]
    VersionConflict { key: String },

    #[error("key not found: {store}/{key}")]
    NotFound { store: String, key: String },

    // Codec errors
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Create a topology parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a transport-failure error for a single endpoint
    pub fn unreachable(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a retryable error.
    ///
    /// `VersionConflict` is deliberately not retryable: blind retry on
    /// conflict risks overwriting a concurrent legitimate metadata update.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::BootstrapExhausted { .. }
                | Self::Unreachable { .. }
                | Self::Timeout
                | Self::StoreUnavailable { .. }
        )
    }

    /// Check if this is a not found error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(Error::Timeout.is_retryable());
        assert!(Error::BootstrapExhausted { attempts: 3 }.is_retryable());
        assert!(Error::unreachable("node0:6666", "connection refused").is_retryable());
        assert!(!Error::VersionConflict { key: "k".into() }.is_retryable());
        assert!(!Error::Parse("bad".into()).is_retryable());
    }

    #[test]
    fn test_error_not_found() {
        assert!(Error::NotFound {
            store: "s".into(),
            key: "k".into()
        }
        .is_not_found());
        assert!(!Error::Timeout.is_not_found());
    }
}
