//! Adapters - Implementations of port interfaces.
//!
//! - `postgres` - sqlx-backed repositories and points ledger
//! - `memory` - in-process store for tests and local runs
//! - `clock` - system and manual clocks
//! - `http` - axum REST API
//! - `scheduler` - periodic expiry sweep

pub mod clock;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod scheduler;

pub use clock::{ManualClock, SystemClock};
pub use memory::InMemoryStore;
pub use scheduler::SweepScheduler;
