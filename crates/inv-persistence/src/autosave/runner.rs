//! Periodic autosave driver.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use super::AutoSaveConfig;
use crate::error::Result;

/// Something the autosave loop can save.
pub trait AutoSaveTarget {
    /// Save if changes are due; `None` when nothing was written.
    fn autosave_tick(&mut self, config: &AutoSaveConfig) -> Option<Result<()>>;

    fn is_read_only(&self) -> bool;
}

/// Run the autosave loop until the target becomes read-only or a save fails.
///
/// Returns immediately when autosave is disabled. Spawn it on the runtime
/// that owns the shared handle.
pub async fn run_autosave<T>(target: Arc<Mutex<T>>, config: AutoSaveConfig)
where
    T: AutoSaveTarget + Send,
{
    if !config.enabled {
        tracing::debug!("autosave disabled");
        return;
    }

    let mut ticker = tokio::time::interval(config.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!(interval_ms = config.interval_ms, "autosave started");

    loop {
        ticker.tick().await;
        let mut guard = target.lock().await;

        if guard.is_read_only() {
            tracing::info!("autosave stopped: session is read-only");
            return;
        }

        match guard.autosave_tick(&config) {
            Some(Ok(())) => tracing::debug!("autosaved session"),
            Some(Err(e)) => {
                tracing::error!(error = %e, "autosave failed, stopping");
                return;
            }
            None => {}
        }
    }
}
