//! Loader Module
//!
//! Memory -> disk -> network lookup for one consumer at a time, on top of the
//! shared [`CacheService`].

mod coordinator;
mod fetch;
mod service;

pub use coordinator::{Completion, FetchCoordinator, RequestOptions};
pub use fetch::Fetcher;
pub use service::{CacheService, DiskTier, MemoryTier};
