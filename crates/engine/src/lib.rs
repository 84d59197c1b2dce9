//! The running engine: the concurrent Index, the Retention Sweeper, and
//! the `Store` façade that binds them to the WAL.
//!
//! - [`index`]: the concurrent, time-ordered in-memory structure.
//! - [`sweeper`]: the background thread that evicts expired observations.
//! - [`config`]: [`StoreConfig`], wiring WAL placement to retention/sweep
//!   settings.
//! - [`store`]: [`Store`], the public entry point.

pub mod config;
pub mod index;
pub mod store;
pub mod sweeper;
pub mod time;

pub use config::StoreConfig;
pub use index::Index;
pub use store::{InitOutcome, InsertOutcome, RejectReason, ShutdownOutcome, Store, StoreStats};
pub use sweeper::RetentionSweeper;
