//! Cache Store Module
//!
//! Bounded key/value store combining a HashMap with LRU tracking and lazy
//! TTL expiration. Expired entries are only removed by the read that finds
//! them; nothing sweeps in the background.

use std::collections::HashMap;

use tracing::trace;

use crate::cache::stats::Counters;
use crate::cache::{CacheEntry, CacheStats, LruTracker, DEFAULT_MAX_SIZE, DEFAULT_TTL_MS};
use crate::clock::{system_clock, SharedClock};

// == Data Cache ==
/// In-process data cache with LRU eviction and per-entry TTL.
#[derive(Debug)]
pub struct DataCache<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Hit/miss/eviction counters
    counters: Counters,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL in milliseconds for writes without an explicit TTL
    default_ttl: u64,
    /// Time source
    clock: SharedClock,
}

impl<T: Clone> DataCache<T> {
    // == Constructor ==
    /// Creates a new cache with the given capacity and default TTL (ms).
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_size: usize, default_ttl: u64) -> Self {
        Self::with_clock(max_size, default_ttl, system_clock())
    }

    /// Creates a new cache reading time from `clock`.
    pub fn with_clock(max_size: usize, default_ttl: u64, clock: SharedClock) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            counters: Counters::default(),
            max_size: max_size.max(1),
            default_ttl,
            clock,
        }
    }

    // == Set ==
    /// Stores a value, overwriting any previous value and resetting its
    /// timestamp.
    ///
    /// When a new key arrives at capacity, exactly one entry, the least
    /// recently used, is evicted first.
    pub fn set(&mut self, key: impl Into<String>, data: T, ttl: Option<u64>) {
        let key = key.into();
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_size {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.counters.record_eviction();
                trace!(key = %evicted_key, "evicted least recently used entry");
            }
        }

        let entry = CacheEntry::new(data, self.clock.now_ms(), ttl.unwrap_or(self.default_ttl));
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// Expired entries are deleted by this call and reported as absent.
    /// A hit moves the key to the most recently used position.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.counters.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.counters.record_miss();
            trace!(key, "dropped expired entry on read");
            return None;
        }

        self.counters.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    // == Peek ==
    /// Returns the raw entry without touching LRU order or counters.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(key)
    }

    // == Delete ==
    /// Removes an entry. Returns `false` when the key was not present.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Empties the whole store. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Stats ==
    /// Returns a snapshot of the cache. Has no side effects.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            max_size: self.max_size,
            keys: self.lru.keys(),
            hits: self.counters.hits,
            misses: self.counters.misses,
            evictions: self.counters.evictions,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }
}

impl<T: Clone> Default for DataCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE, DEFAULT_TTL_MS)
    }
}
