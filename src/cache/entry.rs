//! Cache Entry Module
//!
//! Defines the structure for individual data cache entries with TTL support.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A single cached value plus the time it was written and how long it lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The stored value
    pub data: T,
    /// Write timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Time-to-live in milliseconds
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry written at `now_ms`.
    pub fn new(data: T, now_ms: u64, ttl: u64) -> Self {
        Self {
            data,
            timestamp: now_ms,
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived its TTL at `now_ms`.
    ///
    /// Boundary condition: the entry is expired once `now - timestamp >= ttl`,
    /// so a read exactly at `timestamp + ttl` already misses.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp) >= self.ttl
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds at `now_ms` (0 once expired).
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.timestamp.saturating_add(self.ttl).saturating_sub(now_ms)
    }
}
