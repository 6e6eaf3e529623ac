//! Cache Statistics Module
//!
//! Read-only snapshot of the data cache: occupancy, keys and counters.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot returned by `DataCache::stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of live entries (expired-but-unread entries included)
    pub size: usize,
    /// Capacity of the cache
    pub max_size: usize,
    /// Keys from least to most recently used
    pub keys: Vec<String>,
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries removed to make room for a new key
    pub evictions: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing has been read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Counters ==
/// Running counters kept inside the store.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl Counters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}
