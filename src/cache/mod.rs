//! Cache Module
//!
//! In-process data cache with TTL expiration and LRU eviction, plus the
//! cached-request wrapper used by the data-fetching layer.

mod entry;
mod key;
mod lru;
mod request;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{cache_key, ApiRequest};
pub use lru::LruTracker;
pub use request::{RequestCache, RequestOptions};
pub use stats::CacheStats;
pub use store::DataCache;

// == Public Constants ==
/// Default capacity of a data cache
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default TTL in milliseconds (5 minutes)
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;
