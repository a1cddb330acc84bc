//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers change state; query handlers only read (apart from the
//! expiry sweep that dashboard reads trigger first).

pub mod handlers;

pub use handlers::*;
