//! Error types for cache and rate-limit operations

use thiserror::Error;

/// Main error type for haul-cache
///
/// Plain cache reads and writes are infallible; this type covers
/// configuration validation, typed lookups and internal failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Stored value has a different type than the one requested
    #[error("type mismatch for key {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
