//! Install Retry Task
//!
//! Background task that keeps attempting the worker install until the
//! precache succeeds, then activates the worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::CacheError;
use crate::worker::ServiceWorker;

/// Spawns the install loop for `worker`.
///
/// Each failed precache attempt is logged and retried after
/// `retry_interval_secs`. Until install succeeds the worker is not active
/// and every request passes straight through to the network. With no older
/// worker in this process, a successful install activates immediately.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_install_task(worker: Arc<ServiceWorker>, retry_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(retry_interval_secs);

    tokio::spawn(async move {
        loop {
            match worker.install().await {
                Ok(()) => break,
                Err(e @ CacheError::Install(_)) => {
                    warn!(error = %e, "worker install failed, retrying in {}s", retry_interval_secs);
                    tokio::time::sleep(interval).await;
                }
                Err(e) => {
                    error!(error = %e, "worker install aborted");
                    return;
                }
            }
        }

        match worker.activate().await {
            Ok(purged) => info!(purged = ?purged, "worker took control"),
            Err(e) => error!(error = %e, "worker activation failed"),
        }
    })
}
