//! Error types for the caching core
//!
//! Provides unified error handling using thiserror.
//!
//! Most cache operations deliberately never surface these errors to callers
//! (they degrade to a cache miss); the exceptions are token reads and token
//! refresh, where the caller must know that authentication data is
//! unavailable. Errors are `Clone` because a single refresh failure is
//! delivered to every coalesced caller.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the caching core.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Durable storage read/write/remove failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cached blob could not be serialized or parsed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Image measurement probe failed for a URL
    #[error("Probe failed: {0}")]
    Probe(String),

    /// Token refresh call failed
    #[error("Token refresh failed: {0}")]
    Refresh(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching core.
pub type Result<T> = std::result::Result<T, CacheError>;
