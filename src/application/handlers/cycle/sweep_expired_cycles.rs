//! SweepExpiredCyclesHandler - moves finished ACTIVE weeks into REVIEW.
//!
//! Runs on a timer and before every dashboard read. The storage update is
//! conditional (`status = active AND end_date < today`), so concurrent
//! sweeps never transition the same cycle twice.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::foundation::{DomainError, LocalCalendar};
use crate::ports::{Clock, CycleRepository};

pub struct SweepExpiredCyclesHandler {
    cycles: Arc<dyn CycleRepository>,
    clock: Arc<dyn Clock>,
    calendar: LocalCalendar,
}

impl SweepExpiredCyclesHandler {
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        clock: Arc<dyn Clock>,
        calendar: LocalCalendar,
    ) -> Self {
        Self {
            cycles,
            clock,
            calendar,
        }
    }

    /// Returns how many cycles this call moved to REVIEW.
    pub async fn sweep(&self) -> Result<u64, DomainError> {
        let now = self.clock.now();
        let today = self.calendar.date_of(&now);
        let moved = self.cycles.sweep_expired(today, now).await?;
        if moved > 0 {
            info!(count = moved, today = %today, "expired cycles moved to review");
        } else {
            debug!(today = %today, "no expired cycles");
        }
        Ok(moved)
    }
}
