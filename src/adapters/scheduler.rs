//! Background expiry sweep.
//!
//! Runs `SweepExpiredCyclesHandler` on a fixed interval until the shutdown
//! channel flips to `true`. The page-load trigger inside the read handlers
//! keeps working without it; this loop only bounds how long an ended week
//! can stay ACTIVE when nobody is looking.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::application::handlers::SweepExpiredCyclesHandler;

/// Periodic driver for the expiry sweep.
pub struct SweepScheduler {
    sweeper: Arc<SweepExpiredCyclesHandler>,
    interval: Duration,
}

impl SweepScheduler {
    pub fn new(sweeper: Arc<SweepExpiredCyclesHandler>, interval: Duration) -> Self {
        Self { sweeper, interval }
    }

    /// Run until `shutdown` becomes `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Sweep scheduler stopped");
                        break;
                    }
                }
                _ = interval.tick() => {
                    match self.sweeper.sweep().await {
                        Ok(0) => {}
                        Ok(moved) => tracing::info!(moved, "Scheduled sweep moved cycles to review"),
                        Err(e) => tracing::error!(error = %e, "Scheduled sweep failed"),
                    }
                }
            }
        }
    }
}
