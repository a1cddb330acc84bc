//! Calendar and background sweep configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::{LocalCalendar, MAX_UTC_OFFSET_MINUTES};

use super::error::ValidationError;

/// Settings for day boundaries and the periodic expiry sweep.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Offset of the "local" calendar east of UTC, in minutes
    #[serde(default)]
    pub utc_offset_minutes: i32,

    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,
}

impl ScheduleConfig {
    pub fn calendar(&self) -> Result<LocalCalendar, ValidationError> {
        LocalCalendar::from_offset_minutes(self.utc_offset_minutes)
            .map_err(|_| ValidationError::InvalidUtcOffset(self.utc_offset_minutes))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ValidationError::InvalidUtcOffset(self.utc_offset_minutes));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            sweep_interval_secs: default_sweep_interval(),
            sweep_enabled: default_sweep_enabled(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_sweep_enabled() -> bool {
    true
}
