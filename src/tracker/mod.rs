//! Access-Frequency Tracker Module
//!
//! Records, per cache key, how often and when it was read. The mapping is
//! persisted in full after every access. Nothing reads it to make prefetch
//! decisions.

mod persist;
mod record;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::trace;

use crate::clock::{system_clock, SharedClock};
use crate::error::Result;

pub use persist::{FileUsageStore, MemoryUsageStore, UsageStore};
pub use record::AccessRecord;

/// Persisted key -> record mapping.
pub type UsageMap = BTreeMap<String, AccessRecord>;

// == Access Tracker ==
/// Write-mostly side channel fed by every read through the query layer.
#[derive(Debug)]
pub struct AccessTracker<S> {
    store: S,
    clock: SharedClock,
    /// Serializes load-modify-save cycles
    write_guard: Mutex<()>,
}

/// Shared tracker handle.
pub type SharedTracker<S> = Arc<AccessTracker<S>>;

impl<S: UsageStore> AccessTracker<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, system_clock())
    }

    pub fn with_clock(store: S, clock: SharedClock) -> Self {
        Self {
            store,
            clock,
            write_guard: Mutex::new(()),
        }
    }

    // == Record Access ==
    /// Loads the mapping, bumps the record for `key` and saves the mapping
    /// back. Corrupt persisted state is reported, not repaired.
    pub async fn record_access(&self, key: &str) -> Result<AccessRecord> {
        let _guard = self.write_guard.lock().await;

        let mut usage = self.load().await?;
        let record = usage.entry(key.to_string()).or_default();
        record.record(self.clock.now_ms());
        let updated = record.clone();

        self.store.save(&serde_json::to_string(&usage)?).await?;
        trace!(key, count = updated.count, "recorded access");
        Ok(updated)
    }

    // == Record ==
    /// Returns the persisted record for `key`, if any.
    pub async fn record(&self, key: &str) -> Result<Option<AccessRecord>> {
        Ok(self.load().await?.remove(key))
    }

    /// Returns the whole persisted mapping.
    pub async fn load(&self) -> Result<UsageMap> {
        match self.store.load().await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(UsageMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
