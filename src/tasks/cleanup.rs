//! Expired Entry Cleanup
//!
//! Reads already treat expired entries as misses; this task reclaims their
//! memory in every domain.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::CacheRegistry;

/// Spawns a task that purges expired entries from every domain every
/// `cleanup_interval_secs` seconds.
///
/// The returned handle is aborted on shutdown.
pub fn spawn_cleanup_task(registry: CacheRegistry, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.cleanup_all().await;
            if removed > 0 {
                info!("Cache cleanup: removed {} expired entries", removed);
            } else {
                debug!("Cache cleanup: no expired entries found");
            }
        }
    })
}
