//! Cost Store Module
//!
//! Bounded map combining HashMap storage with LRU tracking and cost accounting.
//! Not synchronized; [`MemoryCache`](crate::cache::MemoryCache) wraps it in a lock.

use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Cost Store ==
/// Key-value storage evicting least recently used entries once the total
/// recorded cost exceeds `max_total_cost`.
#[derive(Debug)]
pub struct CostStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Sum of the cost of resident entries, wide enough that no sum of `u64`
    /// costs overflows it
    total_cost: u128,
    /// Cost limit, 0 means unbounded
    max_total_cost: u64,
}

impl<K, V> CostStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new store with the given cost limit (0 = unbounded).
    pub fn new(max_total_cost: u64) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            total_cost: 0,
            max_total_cost,
        }
    }

    // == Insert ==
    /// Inserts or replaces `key`, then evicts LRU entries while over the limit.
    ///
    /// The entry being inserted is never evicted by its own insertion, so a
    /// single asset costing more than the limit stays resident until the next
    /// insert pushes it out. Returns the number of evicted entries.
    pub fn insert(&mut self, key: K, value: V, cost: u64) -> usize {
        if let Some(old) = self.entries.insert(key.clone(), CacheEntry::new(value, cost)) {
            self.total_cost -= u128::from(old.cost);
        }
        self.total_cost += u128::from(cost);
        self.lru.touch(&key);

        let mut evicted = 0;
        while self.over_limit() && self.entries.len() > 1 {
            let Some(oldest) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&oldest) {
                self.total_cost -= u128::from(entry.cost);
                self.stats.record_eviction();
                evicted += 1;
            }
        }

        self.sync_occupancy();
        evicted
    }

    // == Get ==
    /// Returns a clone of the value and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Removes `key`, returning whether it was resident.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.total_cost -= u128::from(entry.cost);
                self.lru.remove(key);
                self.sync_occupancy();
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Drops every entry. Hit/miss/eviction counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.total_cost = 0;
        self.sync_occupancy();
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Sum of resident costs, saturating at `u64::MAX`.
    pub fn total_cost(&self) -> u64 {
        u64::try_from(self.total_cost).unwrap_or(u64::MAX)
    }

    pub fn max_total_cost(&self) -> u64 {
        self.max_total_cost
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn over_limit(&self) -> bool {
        self.max_total_cost > 0 && self.total_cost > u128::from(self.max_total_cost)
    }

    fn sync_occupancy(&mut self) {
        let total_cost = self.total_cost();
        self.stats.set_occupancy(self.entries.len(), total_cost);
    }
}
