//! Sweep Task
//!
//! Background task that bounds memory by dropping expired cache entries and
//! idle rate-limit identities.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::gate::ApiGate;

/// Spawns a task that calls [`ApiGate::sweep`] every `interval`.
///
/// The task runs until aborted. Keep the handle and abort it on shutdown.
///
/// # Example
/// ```ignore
/// let gate = ApiGate::<serde_json::Value>::from_config(&config)?;
/// let sweeper = spawn_sweep_task(gate.clone(), config.cleanup_interval());
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweep_task<T>(gate: ApiGate<T>, interval: Duration) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let report = gate.sweep().await;
            if report.expired_entries > 0 || report.idle_identities > 0 {
                info!(
                    expired_entries = report.expired_entries,
                    idle_identities = report.idle_identities,
                    "sweep removed stale state"
                );
            } else {
                debug!("sweep found nothing to remove");
            }
        }
    })
}
