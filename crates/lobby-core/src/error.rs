//! Error types for store backends.
//!
//! Provides explicit error variants with actionable context. Absence of a
//! key is generally *not* an error at this layer (reads return `Option`);
//! `NotFound` exists for operations that require the key to be present,
//! such as overwriting a list slot.

use thiserror::Error;

/// Errors returned by a [`crate::ListStore`] backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Requested key was not found where the operation requires it.
    #[error("key '{key}' not found")]
    NotFound { key: String },

    /// Key holds a value of the wrong shape for the requested operation.
    #[error("key '{key}' holds a {actual}, expected a {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// List index is outside the current bounds of the list.
    #[error("index {index} out of range for list '{key}'")]
    IndexOutOfRange { key: String, index: u64 },

    /// Compare-and-swap guard did not match the current value.
    #[error("compare-and-swap failed for key '{key}': expected {expected:?}, found {actual:?}")]
    CompareAndSwapFailed {
        key: String,
        expected: Option<String>,
        actual: Option<String>,
    },

    /// Backend failed (network/storage/serialization inside the backend).
    #[error("store operation failed: {reason}")]
    Failed { reason: String },

    /// Operation exceeded the backend's own timeout policy.
    #[error("store operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = StoreError::NotFound {
            key: "my-key".to_string(),
        };
        assert_eq!(err.to_string(), "key 'my-key' not found");
    }

    #[test]
    fn wrong_type_display() {
        let err = StoreError::WrongType {
            key: "waiting".to_string(),
            expected: "list",
            actual: "scalar",
        };
        assert_eq!(err.to_string(), "key 'waiting' holds a scalar, expected a list");
    }

    #[test]
    fn cas_failed_display_mentions_both_sides() {
        let err = StoreError::CompareAndSwapFailed {
            key: "station:1".to_string(),
            expected: None,
            actual: Some("exists".to_string()),
        };
        assert!(err.to_string().contains("expected None"));
        assert!(err.to_string().contains("found Some"));
    }

    #[test]
    fn error_equality() {
        let err1 = StoreError::NotFound { key: "a".to_string() };
        let err2 = StoreError::NotFound { key: "a".to_string() };
        let err3 = StoreError::Timeout { duration_ms: 100 };

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
