//! Background Revalidation Task
//!
//! Refreshes one stored API response off the request path. The spawning
//! request never awaits this task and never sees its outcome.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::worker::{is_cacheable, FetchRequest, NamedCache, SharedNetwork};

/// Spawns a detached fetch that overwrites the stored entry for `request`
/// when the new response is cacheable.
///
/// Failures are logged at debug level and dropped. Overlapping
/// revalidations of the same URL are allowed; the last one to finish wins.
///
/// # Returns
/// The task handle. Callers on the request path drop it, which detaches
/// the task.
pub fn spawn_revalidation(
    store: Arc<NamedCache>,
    network: SharedNetwork,
    request: FetchRequest,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match network.fetch(&request).await {
            Ok(response) if is_cacheable(&response) => {
                store.put(&request, response).await;
                debug!(url = %request.cache_key(), "background revalidation stored fresh response");
            }
            Ok(response) => {
                debug!(
                    url = %request.cache_key(),
                    status = %response.status,
                    "background revalidation response not cacheable"
                );
            }
            Err(e) => {
                debug!(url = %request.cache_key(), error = %e, "background revalidation failed");
            }
        }
    })
}
