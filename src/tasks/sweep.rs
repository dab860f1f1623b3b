//! Cache Sweep Task
//!
//! Background task that periodically sweeps the cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a task that calls [`CacheManager::sweep`] every `interval`.
///
/// The first sweep runs one full interval after spawning. The sweep itself
/// yields between batches, so the task shares the runtime with request
/// handling rather than monopolizing it.
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop sweeping.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweep_task(cache.clone(), Duration::from_secs(3600));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<CacheManager>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            max_items = cache.max_items(),
            "starting cache sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let report = cache.sweep().await;

            if report.removed() > 0 || report.adopted > 0 || report.orphans_dropped > 0 {
                info!(
                    expired = report.expired,
                    evicted = report.evicted,
                    corrupt = report.corrupt,
                    adopted = report.adopted,
                    orphans_dropped = report.orphans_dropped,
                    "cache sweep finished"
                );
            } else {
                debug!("cache sweep: nothing to do");
            }
        }
    })
}
