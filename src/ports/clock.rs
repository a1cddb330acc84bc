//! Clock port.
//!
//! Day-based rules (once per day, end of week, expiry) read the current time
//! through this port so tests can move time deterministically.

use crate::domain::foundation::Timestamp;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
