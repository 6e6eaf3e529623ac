//! Scripted network for worker tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use tokio::sync::Notify;

use crate::error::{CacheError, Result};
use crate::worker::{FetchRequest, Network, StoredResponse};

#[derive(Debug, Default)]
pub struct FakeNetwork {
    responses: Mutex<HashMap<String, StoredResponse>>,
    offline: AtomicBool,
    hold: AtomicBool,
    release: Notify,
    calls: AtomicUsize,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, response: StoredResponse) {
        let key = FetchRequest::get(url).unwrap().cache_key();
        self.responses.lock().unwrap().insert(key, response);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes every fetch wait for `release_one` before answering.
    pub fn hold(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    pub fn release_one(&self) {
        self.release.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.calls() < n {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("network was not called in time");
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::Network("offline".to_string()));
        }
        let found = self
            .responses
            .lock()
            .unwrap()
            .get(&request.cache_key())
            .cloned();
        Ok(found.unwrap_or_else(|| StoredResponse::new(StatusCode::NOT_FOUND, "not found")))
    }
}

/// Polls until `check` holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
