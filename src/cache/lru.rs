//! LRU Tracker Module
//!
//! Implements least-recently-used ordering for data cache eviction.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Every touch stamps the key with a fresh, strictly increasing sequence
/// number. The smallest live sequence number is the least recently used key.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Sequence number -> key, oldest first
    order: BTreeMap<u64, String>,
    /// Key -> its current sequence number
    positions: HashMap<String, u64>,
    /// Next sequence number to hand out
    next_seq: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, inserting it if new.
    pub fn touch(&mut self, key: &str) {
        if let Some(old) = self.positions.get(key).copied() {
            self.order.remove(&old);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.to_string());
        self.positions.insert(key.to_string(), seq);
    }

    // == Remove ==
    /// Stops tracking a key. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(seq) = self.positions.remove(key) {
            self.order.remove(&seq);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.positions.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.values().next().map(String::as_str)
    }

    /// Keys ordered from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.order.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }
}
