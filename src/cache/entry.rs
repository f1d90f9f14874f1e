//! Cache Entry Module
//!
//! Defines a resident memory tier entry and the cost recorded for it.

// == Cache Entry ==
/// A decoded asset held by the memory tier, plus its eviction cost.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored asset
    pub value: V,
    /// Approximate memory footprint recorded at insertion
    pub cost: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    pub fn new(value: V, cost: u64) -> Self {
        Self { value, cost }
    }
}
