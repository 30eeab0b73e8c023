//! Expired-Entry Sweep Task
//!
//! Background task that periodically removes TTL-expired dimension entries,
//! so the durable blob does not grow with measurements nobody reads anymore.
//! Read paths already prune lazily; this sweep covers entries that are never
//! read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::DimensionCache;

/// Spawns a background task that periodically sweeps expired dimension
/// entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. Intended to be started once at app startup; abort the
/// returned handle during shutdown.
///
/// # Arguments
/// * `dimensions` - Handle to the dimension cache to sweep
/// * `sweep_interval_secs` - Interval in seconds between sweeps
pub fn spawn_sweep_task(dimensions: DimensionCache, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting dimension cache sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = dimensions.sweep_expired().await;

            if removed > 0 {
                info!("Sweep: removed {} expired dimension entries", removed);
            } else {
                debug!("Sweep: no expired dimension entries found");
            }
        }
    })
}
