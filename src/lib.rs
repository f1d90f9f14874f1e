//! ImageKit - a two-tier image cache
//!
//! Serves previously fetched images by URL from a bounded memory tier backed
//! by an unbounded disk tier, and loads per consumer so that only the most
//! recent request of that consumer is ever shown.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod loader;

pub use cache::{DiskCache, MemoryCache};
pub use codec::{BytesCodec, Codec};
pub use config::Config;
pub use error::{CacheError, Result};
pub use loader::{CacheService, FetchCoordinator, Fetcher, RequestOptions};
