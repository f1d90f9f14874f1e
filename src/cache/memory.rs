//! In-memory tier with cost-aware LRU eviction.

use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::trace;

use crate::cache::{CacheStats, Cacheable, CostStore};
use crate::error::{CacheError, Result};

type CostFn<V> = dyn Fn(&V) -> u64 + Send + Sync;

/// Thread-safe memory tier for decoded assets.
///
/// Every operation takes the lock for exactly one store call and releases it
/// before returning, so the lock is never held across I/O or `.await`.
pub struct MemoryCache<K, V> {
    store: Mutex<CostStore<K, V>>,
    cost: Arc<CostFn<V>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates a memory tier.
    ///
    /// # Arguments
    ///
    /// * `max_total_cost` - Cost limit before eviction starts (0 = unbounded)
    /// * `cost` - Approximate footprint of an asset
    pub fn new<F>(max_total_cost: u64, cost: F) -> Self
    where
        F: Fn(&V) -> u64 + Send + Sync + 'static,
    {
        Self {
            store: Mutex::new(CostStore::new(max_total_cost)),
            cost: Arc::new(cost),
        }
    }

    /// Returns the asset for `key`, or `None` on a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key)
    }

    /// Inserts or replaces `key`. `None` removes it instead.
    pub fn put(&self, value: Option<V>, key: K) {
        let Some(value) = value else {
            self.remove(&key);
            return;
        };

        let cost = (self.cost)(&value);
        let evicted = self.lock().insert(key, value, cost);
        if evicted > 0 {
            trace!(evicted, cost, "memory tier evicted entries");
        }
    }

    pub fn remove(&self, key: &K) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn total_cost(&self) -> u64 {
        self.lock().total_cost()
    }

    pub fn max_total_cost(&self) -> u64 {
        self.lock().max_total_cost()
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    fn lock(&self) -> MutexGuard<'_, CostStore<K, V>> {
        // The store has no invariant a panicking caller could break halfway.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> fmt::Debug for MemoryCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("stats", &self.stats())
            .field("max_total_cost", &self.max_total_cost())
            .finish()
    }
}

#[async_trait]
impl<K, V> Cacheable<K> for MemoryCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    type Value = V;

    async fn get(&self, key: &K) -> Result<V> {
        MemoryCache::get(self, key).ok_or_else(|| CacheError::NotFound(format!("{key:?}")))
    }

    async fn put(&self, value: Option<V>, key: &K) {
        MemoryCache::put(self, value, key.clone());
    }

    async fn remove(&self, key: &K) {
        MemoryCache::remove(self, key);
    }

    async fn clear(&self) {
        MemoryCache::clear(self);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn cache(max_total_cost: u64) -> MemoryCache<String, Vec<u8>> {
        MemoryCache::new(max_total_cost, |v: &Vec<u8>| v.len() as u64)
    }

    #[test]
    fn test_memory_put_and_get() {
        let cache = cache(0);
        cache.put(Some(vec![1, 2, 3]), "a".into());

        assert_eq!(cache.get(&"a".into()), Some(vec![1, 2, 3]));
        assert_eq!(cache.total_cost(), 3);
    }

    #[test]
    fn test_memory_put_none_removes() {
        let cache = cache(0);
        cache.put(Some(vec![1]), "a".into());
        cache.put(None, "a".into());

        assert_eq!(cache.get(&"a".into()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_memory_remove_and_clear_are_idempotent() {
        let cache = cache(0);
        cache.put(Some(vec![1]), "a".into());
        cache.put(Some(vec![2]), "b".into());

        cache.remove(&"a".into());
        cache.remove(&"a".into());
        assert_eq!(cache.len(), 1);

        cache.clear();
        cache.clear();
        assert!(cache.is_empty());

        cache.put(Some(vec![3]), "c".into());
        assert_eq!(cache.get(&"c".into()), Some(vec![3]));
    }

    #[test]
    fn test_memory_eviction_under_pressure() {
        let cache = cache(10);
        cache.put(Some(vec![0; 4]), "a".into());
        cache.put(Some(vec![0; 4]), "b".into());
        cache.put(Some(vec![0; 4]), "c".into());

        assert_eq!(cache.get(&"a".into()), None);
        assert!(cache.get(&"c".into()).is_some());
        assert!(cache.total_cost() <= 10);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_memory_saturated_cost_keeps_accounting() {
        let cache: MemoryCache<String, Vec<u8>> = MemoryCache::new(0, |v: &Vec<u8>| {
            if v.is_empty() {
                u64::MAX
            } else {
                v.len() as u64
            }
        });

        cache.put(Some(Vec::new()), "huge".into());
        cache.put(Some(vec![1, 2]), "small".into());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.total_cost(), u64::MAX);

        cache.put(None, "huge".into());
        assert_eq!(cache.total_cost(), 2);
        assert_eq!(cache.get(&"small".into()), Some(vec![1, 2]));
    }

    #[test]
    fn test_memory_concurrent_writers_same_key() {
        let cache = Arc::new(cache(0));
        let payloads = [vec![1u8; 64], vec![2u8; 64]];

        let handles: Vec<_> = payloads
            .iter()
            .cloned()
            .map(|payload| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for _ in 0..200 {
                        cache.put(Some(payload.clone()), "shared".into());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = cache.get(&"shared".into()).unwrap();
        assert!(payloads.contains(&stored));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.total_cost(), 64);
    }

    #[tokio::test]
    async fn test_memory_through_trait() {
        let cache = cache(0);
        let tier: &dyn Cacheable<String, Value = Vec<u8>> = &cache;

        assert!(matches!(
            tier.get(&"a".to_string()).await,
            Err(CacheError::NotFound(_))
        ));

        tier.put(Some(vec![9]), &"a".to_string()).await;
        assert_eq!(tier.get(&"a".to_string()).await.unwrap(), vec![9]);

        tier.clear().await;
        assert!(cache.is_empty());
    }
}
