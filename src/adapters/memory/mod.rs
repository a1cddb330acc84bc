//! In-memory storage adapter.
//!
//! One `RwLock` guards every table, so each port call is atomic with
//! respect to every other call. That gives the same guarantees the
//! PostgreSQL adapter gets from constraints and transactions, which makes
//! this store suitable for tests and single-process local runs.

mod store;

pub use store::InMemoryStore;
