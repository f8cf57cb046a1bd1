//! Error types for the uniques collector
//!
//! Two kinds reach callers: [`ValidationError`] for bad input and
//! [`StorageError`] for anything the backing engine reports. An empty day
//! or window is a zero count, never an error.

use thiserror::Error;

/// Result type alias using UniquesError
pub type Result<T> = std::result::Result<T, UniquesError>;

/// Unified error type for uniques operations
#[derive(Debug, Error)]
pub enum UniquesError {
    // Caller input errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // Backing engine errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl UniquesError {
    /// Whether the caller sent bad input (client error)
    pub fn is_validation(&self) -> bool {
        matches!(self, UniquesError::Validation(_))
    }
}

/// Malformed caller input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid client id: {0:?}")]
    InvalidClientId(String),

    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    #[error("Invalid date (expected YYYYMMDD): {0:?}")]
    InvalidDate(String),
}

/// Failures reported by a counting store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Operation deadline exceeded")]
    DeadlineExceeded,
}
