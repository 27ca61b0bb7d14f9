//! ExpirySweeper - Background eviction of stale preview sessions.
//!
//! Each tick snapshots stale session IDs under the read lock, then removes
//! them one by one under the write lock after re-checking staleness. A
//! session touched between the two steps survives.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 30s | How often to look for stale sessions |
//!
//! ## Shutdown
//!
//! The sweeper stops when the registry's shutdown token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::registry::SessionRegistry;

/// Default period between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Periodic task evicting idle and over-age sessions.
pub struct ExpirySweeper {
    registry: Arc<SessionRegistry>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            registry,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; nothing can be stale yet.
        interval.tick().await;

        tracing::info!(interval_secs = self.interval.as_secs(), "Expiry sweeper started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Expiry sweeper stopped");
                    return;
                }
                _ = interval.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// Run exactly one sweep.
    pub async fn sweep_once(&self) -> usize {
        let removed = self.registry.sweep().await;
        if removed > 0 {
            tracing::info!(removed, "Swept expired preview sessions");
        }
        removed
    }

    /// Spawn the loop on the runtime, stopping with the registry.
    pub fn spawn(self) -> JoinHandle<()> {
        let shutdown = self.registry.shutdown_token();
        tokio::spawn(async move { self.run(shutdown).await })
    }
}
