//! Access Record Module

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::ACCESS_HISTORY_LIMIT;

// == Access Record ==
/// How often, and when, a single cache key was read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRecord {
    /// Total number of recorded accesses
    pub count: u64,
    /// Most recent access (Unix milliseconds)
    pub last_accessed: u64,
    /// Most recent access times, oldest first, at most ten
    pub timestamps: VecDeque<u64>,
}

impl AccessRecord {
    /// Counts one access at `now_ms`, dropping the oldest timestamp once the
    /// window is full.
    pub fn record(&mut self, now_ms: u64) {
        self.count += 1;
        self.last_accessed = now_ms;
        self.timestamps.push_back(now_ms);
        while self.timestamps.len() > ACCESS_HISTORY_LIMIT {
            self.timestamps.pop_front();
        }
    }
}
