//! Worker Lifecycle Module
//!
//! One versioned worker: install precaches the static assets, activate
//! purges stores left by older versions, and fetch routes every intercepted
//! request to a strategy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::http::Method;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clock::{system_clock, SharedClock};
use crate::config::{Config, API_FRESHNESS_MS, API_PATH_MARKER};
use crate::error::{CacheError, Result};
use crate::models::ControlMessage;
use crate::worker::strategy::{cache_first, network_first, stale_while_revalidate, StrategyContext};
use crate::worker::{resolve, CacheStorage, FetchRequest, RequestMode, SharedNetwork, StoredResponse};

// == Worker State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Installing,
    /// Installed, waiting to take over
    Waiting,
    /// Controlling fetches
    Active,
    /// Replaced by a newer version
    Redundant,
}

// == Route ==
/// Strategy chosen for an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Passthrough,
    StaleWhileRevalidate,
    NetworkFirst,
    CacheFirst,
}

// == Fetch Outcome ==
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The worker answered
    Respond(StoredResponse),
    /// The worker declined; the request goes to the network untouched
    Passthrough,
}

// == Worker Settings ==
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub app_name: String,
    pub version: String,
    /// The application's own origin
    pub origin: String,
    /// Root-relative paths stored at install
    pub precache_assets: Vec<String>,
}

impl WorkerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            app_name: config.app_name.clone(),
            version: config.cache_version.clone(),
            origin: config.upstream_origin.clone(),
            precache_assets: config.precache_assets.clone(),
        }
    }

    pub fn store_prefix(&self) -> String {
        format!("{}-cache-", self.app_name)
    }

    pub fn store_name(&self) -> String {
        format!("{}{}", self.store_prefix(), self.version)
    }

    fn origin(&self) -> String {
        self.origin.trim_end_matches('/').to_ascii_lowercase()
    }
}

// == Worker Status ==
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub version: String,
    pub store: String,
    pub stores: Vec<String>,
    pub cached_entries: usize,
}

// == Service Worker ==
#[derive(Debug)]
pub struct ServiceWorker {
    settings: WorkerSettings,
    storage: CacheStorage,
    network: SharedNetwork,
    clock: SharedClock,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
}

impl ServiceWorker {
    pub fn new(settings: WorkerSettings, storage: CacheStorage, network: SharedNetwork) -> Self {
        Self::with_clock(settings, storage, network, system_clock())
    }

    pub fn with_clock(
        settings: WorkerSettings,
        storage: CacheStorage,
        network: SharedNetwork,
        clock: SharedClock,
    ) -> Self {
        Self {
            settings,
            storage,
            network,
            clock,
            state: RwLock::new(WorkerState::Installing),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn network(&self) -> &SharedNetwork {
        &self.network
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    // == Install ==
    /// Fetches every precache asset and stores them all in the versioned
    /// store. Any failed fetch or non-success status aborts the install:
    /// nothing is stored and the worker stays `Installing` so the caller
    /// can retry. A skip-waiting request received earlier activates the
    /// worker as soon as it is installed.
    pub async fn install(&self) -> Result<()> {
        {
            let state = self.state.read().await;
            if *state != WorkerState::Installing {
                return Err(CacheError::InvalidRequest(format!(
                    "cannot install a worker in state {:?}",
                    *state
                )));
            }
        }

        let store_name = self.settings.store_name();
        info!(store = %store_name, assets = self.settings.precache_assets.len(), "installing worker");

        let mut fetched = Vec::with_capacity(self.settings.precache_assets.len());
        for path in &self.settings.precache_assets {
            let request = FetchRequest::get(&resolve(&self.settings.origin, path))?;
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| CacheError::Install(format!("{path}: {e}")))?;
            if !response.status.is_success() {
                return Err(CacheError::Install(format!(
                    "{path}: upstream answered {}",
                    response.status
                )));
            }
            fetched.push((request, response));
        }

        let store = self.storage.open(&store_name).await;
        store.put_all(fetched).await;

        *self.state.write().await = WorkerState::Waiting;
        info!(store = %store_name, "worker installed, waiting");

        if self.skip_waiting_requested() {
            self.activate().await?;
        }
        Ok(())
    }

    // == Skip Waiting ==
    /// Lets a waiting worker activate without waiting for old clients.
    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    // == Handle Message ==
    /// Applies a client control message and returns the resulting state.
    pub async fn handle_message(&self, message: ControlMessage) -> Result<WorkerState> {
        match message {
            ControlMessage::SkipWaiting => {
                self.skip_waiting();
                if self.state().await == WorkerState::Waiting {
                    self.activate().await?;
                }
            }
        }
        Ok(self.state().await)
    }

    // == Activate ==
    /// Deletes every store carrying this application's prefix except the
    /// current version's, then takes control. Returns the purged names.
    pub async fn activate(&self) -> Result<Vec<String>> {
        match self.state().await {
            WorkerState::Waiting => {}
            WorkerState::Active => return Ok(Vec::new()),
            other => {
                return Err(CacheError::InvalidRequest(format!(
                    "cannot activate a worker in state {other:?}"
                )))
            }
        }

        let prefix = self.settings.store_prefix();
        let current = self.settings.store_name();
        let mut purged = Vec::new();
        for name in self.storage.keys().await {
            if name.starts_with(&prefix) && name != current && self.storage.delete(&name).await {
                info!(store = %name, "purged old cache store");
                purged.push(name);
            }
        }

        *self.state.write().await = WorkerState::Active;
        info!(store = %current, purged = purged.len(), "worker active");
        Ok(purged)
    }

    /// Marks this worker as replaced.
    pub async fn supersede(&self) {
        *self.state.write().await = WorkerState::Redundant;
        warn!(version = %self.settings.version, "worker superseded");
    }

    /// Whether `request` targets the application's own origin.
    pub fn is_same_origin(&self, request: &FetchRequest) -> bool {
        request.origin() == self.settings.origin()
    }

    // == Route ==
    /// Picks the strategy for a request, in strict priority order.
    pub fn route(&self, request: &FetchRequest) -> Route {
        if !self.is_same_origin(request) {
            Route::Passthrough
        } else if request.method != Method::GET {
            Route::Passthrough
        } else if request.uri.to_string().contains(API_PATH_MARKER) {
            Route::StaleWhileRevalidate
        } else if request.mode == RequestMode::Navigate {
            Route::NetworkFirst
        } else {
            Route::CacheFirst
        }
    }

    // == Handle Fetch ==
    /// Answers an intercepted request. Workers that are not active let
    /// everything through.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<FetchOutcome> {
        if self.state().await != WorkerState::Active {
            return Ok(FetchOutcome::Passthrough);
        }

        let route = self.route(request);
        debug!(url = %request.cache_key(), ?route, "intercepted fetch");

        let ctx = self.strategy_context().await;
        let response = match route {
            Route::Passthrough => return Ok(FetchOutcome::Passthrough),
            Route::StaleWhileRevalidate => stale_while_revalidate(&ctx, request).await?,
            Route::NetworkFirst => network_first(&ctx, request).await?,
            Route::CacheFirst => cache_first(&ctx, request).await?,
        };
        Ok(FetchOutcome::Respond(response))
    }

    async fn strategy_context(&self) -> StrategyContext {
        StrategyContext {
            store: self.storage.open(&self.settings.store_name()).await,
            network: Arc::clone(&self.network),
            clock: Arc::clone(&self.clock),
            root_document_key: FetchRequest::get(&resolve(&self.settings.origin, "/"))
                .map(|r| r.cache_key())
                .unwrap_or_else(|_| format!("{}/", self.settings.origin())),
            freshness_ms: API_FRESHNESS_MS,
        }
    }

    // == Status ==
    pub async fn status(&self) -> WorkerStatus {
        let store_name = self.settings.store_name();
        let cached_entries = if self.storage.has(&store_name).await {
            self.storage.open(&store_name).await.len().await
        } else {
            0
        };
        WorkerStatus {
            state: self.state().await,
            version: self.settings.version.clone(),
            store: store_name,
            stores: self.storage.keys().await,
            cached_entries,
        }
    }
}
