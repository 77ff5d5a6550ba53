//! Periodic expiry sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::CacheStore;

/// Handle to the detached sweep task.
///
/// The sweep runs on a fixed timer independent of request handling and never
/// blocks a foreground computation. The task is aborted on [`Sweeper::stop`]
/// or when the handle drops as part of teardown; there is no cancellation of
/// an individual in-flight sweep.
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn a sweep loop over `store` at the given interval.
    pub fn spawn(store: Arc<dyn CacheStore>, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so a fresh store
            // is not swept at startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = store.sweep().await;
                if removed > 0 {
                    tracing::debug!(
                        target: "uplevel::cache",
                        removed,
                        "sweep removed expired entries"
                    );
                }
            }
        });
        Self { handle }
    }

    /// Stop the sweep task.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
