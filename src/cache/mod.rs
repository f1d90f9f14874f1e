//! Cache Module
//!
//! Two peer tiers behind one trait: a bounded in-memory tier for decoded
//! assets and an unbounded on-disk tier for their encoded bytes.

mod cacheable;
mod disk;
mod entry;
pub mod key;
mod lru;
mod memory;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use cacheable::Cacheable;
pub use disk::{ByteStore, DiskCache, FsStore};
pub use entry::CacheEntry;
pub use key::{normalize, NormalizedKey};
pub use lru::LruTracker;
pub use memory::MemoryCache;
pub use stats::CacheStats;
pub use store::CostStore;
