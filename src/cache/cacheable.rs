//! Cache trait shared by the memory and disk tiers.

use async_trait::async_trait;

use crate::error::Result;

/// One cache tier keyed by `K`.
///
/// Lets the loader hold either tier behind the same interface. Misses are
/// reported as [`CacheError::NotFound`](crate::error::CacheError::NotFound);
/// writes are best-effort and never fail.
#[async_trait]
pub trait Cacheable<K: ?Sized + Sync>: Send + Sync {
    type Value: Send;

    /// Looks up `key`.
    async fn get(&self, key: &K) -> Result<Self::Value>;

    /// Stores `value` under `key`. What `None` means is up to the tier.
    async fn put(&self, value: Option<Self::Value>, key: &K);

    /// Removes `key` if present.
    async fn remove(&self, key: &K);

    /// Removes every entry.
    async fn clear(&self);
}
