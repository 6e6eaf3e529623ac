//! Cache Storage Module
//!
//! Named, versioned response stores. The storage outlives any single worker
//! version, so a new version can find and purge the stores of old ones.
//! Each store is a URL-keyed map; concurrent writers to one key simply
//! overwrite each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::worker::{FetchRequest, StoredResponse};

// == Named Cache ==
#[derive(Debug, Default)]
pub struct NamedCache {
    name: String,
    entries: RwLock<HashMap<String, StoredResponse>>,
}

impl NamedCache {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up the entry for the request's normalized URL.
    pub async fn match_request(&self, request: &FetchRequest) -> Option<StoredResponse> {
        self.match_key(&request.cache_key()).await
    }

    pub async fn match_key(&self, key: &str) -> Option<StoredResponse> {
        self.entries.read().await.get(key).cloned()
    }

    /// Stores `response` under the request's normalized URL, replacing any
    /// previous entry.
    pub async fn put(&self, request: &FetchRequest, response: StoredResponse) {
        let key = request.cache_key();
        debug!(store = %self.name, %key, "stored response");
        self.entries.write().await.insert(key, response);
    }

    /// Stores several responses under one lock.
    pub async fn put_all(&self, items: Vec<(FetchRequest, StoredResponse)>) {
        let mut entries = self.entries.write().await;
        for (request, response) in items {
            entries.insert(request.cache_key(), response);
        }
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// == Cache Storage ==
/// Shared registry of named stores.
#[derive(Debug, Default, Clone)]
pub struct CacheStorage {
    stores: Arc<RwLock<HashMap<String, Arc<NamedCache>>>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the named store, creating it if it does not exist.
    pub async fn open(&self, name: &str) -> Arc<NamedCache> {
        if let Some(store) = self.stores.read().await.get(name) {
            return Arc::clone(store);
        }
        let mut stores = self.stores.write().await;
        Arc::clone(
            stores
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(NamedCache::new(name))),
        )
    }

    pub async fn has(&self, name: &str) -> bool {
        self.stores.read().await.contains_key(name)
    }

    /// Deletes a whole store. Returns `false` if it did not exist.
    pub async fn delete(&self, name: &str) -> bool {
        self.stores.write().await.remove(name).is_some()
    }

    /// Store names, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}
