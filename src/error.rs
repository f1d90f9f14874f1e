//! Error types for the image cache
//!
//! Provides unified error handling using thiserror.

use std::io;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for both cache tiers and the loader.
///
/// Load requests surface [`CacheError::RemoteFetch`] and
/// [`CacheError::InvalidKey`]. Misses (see [`CacheError::is_miss`]) fall
/// through to the next tier, and failed writes are logged and skipped. A
/// disk tier error that is not a miss ends the load.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is not present in the tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Stored entry exists but could not be read or decoded
    #[error("Corrupt cache entry for {key}: {reason}")]
    CorruptData { key: String, reason: String },

    /// Asset could not be serialized for storage
    #[error("Failed to encode asset for {key}: {reason}")]
    EncodeFailure { key: String, reason: String },

    /// Creating or clearing the cache directory failed
    #[error("Directory operation failed: {0}")]
    DirectoryOperation(#[from] io::Error),

    /// The network collaborator failed to produce bytes
    #[error("Remote fetch failed for {key}")]
    RemoteFetch {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Key cannot be turned into a fetchable URL
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

impl CacheError {
    // == Miss Check ==
    /// Returns true for errors a lookup treats as an ordinary miss.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            CacheError::NotFound(_) | CacheError::CorruptData { .. }
        )
    }
}

// == Codec Error ==
/// Failure reported by a [`Codec`](crate::codec::Codec).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),
}

// == Result Type Alias ==
/// Convenience Result type for the image cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_classification() {
        assert!(CacheError::NotFound("a".into()).is_miss());
        assert!(CacheError::CorruptData {
            key: "a".into(),
            reason: "empty".into()
        }
        .is_miss());
        assert!(!CacheError::InvalidKey("a".into()).is_miss());
        assert!(!CacheError::RemoteFetch {
            key: "a".into(),
            source: anyhow::anyhow!("offline"),
        }
        .is_miss());
    }

    #[test]
    fn test_remote_fetch_keeps_source() {
        let err = CacheError::RemoteFetch {
            key: "http://x/img.png".into(),
            source: anyhow::anyhow!("connection reset"),
        };

        assert_eq!(err.to_string(), "Remote fetch failed for http://x/img.png");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "connection reset");
    }
}
