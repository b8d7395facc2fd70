//! Error types for dexcache
//!
//! Defines the crate-wide error enum plus the narrower errors each component
//! returns. Uses thiserror for ergonomic error handling.

use crate::cache::{InvalidKeyError, StoreError};
use crate::upstream::FetchError;
use thiserror::Error;

/// Result type alias for dexcache operations
pub type Result<T> = std::result::Result<T, DexCacheError>;

/// Comprehensive error type for dexcache operations
#[derive(Error, Debug)]
pub enum DexCacheError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream fetch errors (index or detail)
    #[error("Upstream error: {0}")]
    Fetch(#[from] FetchError),

    /// Cache store errors
    #[error("Cache error: {0}")]
    Store(#[from] StoreError),

    /// The cache table could not be created; nothing can be served
    #[error("Startup failed: {0}")]
    Startup(StoreError),

    /// Lookup key could not be interpreted as an id
    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyError),

    /// The population worker is gone (stopped or panicked)
    #[error("Population worker unavailable: {0}")]
    Worker(String),

    /// Population did not finish in the allotted time
    #[error("Population still running after {0} seconds")]
    Timeout(u64),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_is_transparent() {
        let err: DexCacheError = InvalidKeyError::new("abc").into();
        assert_eq!(err.to_string(), InvalidKeyError::new("abc").to_string());
    }

    #[test]
    fn test_startup_display() {
        let err = DexCacheError::Startup(StoreError::AlreadyInitialized);
        assert!(err.to_string().starts_with("Startup failed"));
    }

    #[test]
    fn test_fetch_conversion() {
        let err: DexCacheError = FetchError::decode("missing id").into();
        assert!(matches!(err, DexCacheError::Fetch(FetchError::Decode { .. })));
    }
}
