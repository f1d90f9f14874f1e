//! Shared cache service handed to every consumer.

use std::sync::Arc;

use tracing::info;

use crate::cache::{Cacheable, DiskCache, MemoryCache};
use crate::codec::Codec;
use crate::config::Config;
use crate::loader::Fetcher;

/// Memory tier as seen by the loader.
pub type MemoryTier<A> = dyn Cacheable<String, Value = A>;
/// Disk tier as seen by the loader.
pub type DiskTier<A> = dyn Cacheable<str, Value = A>;

/// Process-wide tiers, fetcher and codec.
///
/// Built once by the application and shared through an `Arc` by all
/// [`FetchCoordinator`](crate::loader::FetchCoordinator)s.
pub struct CacheService<A> {
    memory: Arc<MemoryTier<A>>,
    disk: Arc<DiskTier<A>>,
    fetcher: Arc<dyn Fetcher>,
    codec: Arc<dyn Codec<Asset = A>>,
}

impl<A: Clone + Send + Sync + 'static> CacheService<A> {
    pub fn new(
        memory: Arc<MemoryTier<A>>,
        disk: Arc<DiskTier<A>>,
        fetcher: Arc<dyn Fetcher>,
        codec: Arc<dyn Codec<Asset = A>>,
    ) -> Self {
        Self {
            memory,
            disk,
            fetcher,
            codec,
        }
    }

    /// Builds both tiers from `config`, charging memory by `codec.cost`.
    pub fn from_config(
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        codec: Arc<dyn Codec<Asset = A>>,
    ) -> Self {
        let cost_codec = Arc::clone(&codec);
        let memory: MemoryCache<String, A> =
            MemoryCache::new(config.max_total_cost, move |asset: &A| cost_codec.cost(asset));
        let disk = DiskCache::open(config, Arc::clone(&codec));

        info!(
            max_total_cost = config.max_total_cost,
            dir = %disk.dir().display(),
            "image cache initialized"
        );

        Self::new(Arc::new(memory), Arc::new(disk), fetcher, codec)
    }

    pub fn memory(&self) -> &MemoryTier<A> {
        &*self.memory
    }

    pub fn disk(&self) -> &DiskTier<A> {
        &*self.disk
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        &*self.fetcher
    }

    pub fn codec(&self) -> &dyn Codec<Asset = A> {
        &*self.codec
    }

    /// Empties both tiers.
    pub async fn clear(&self) {
        self.memory.clear().await;
        self.disk.clear().await;
    }
}
