//! Core types shared by the WAL, engine, and CLI crates.
//!
//! - [`DataPoint`] / [`Tags`]: the observation data model.
//! - [`limits`]: compile-time retention/rotation constants.
//!
//! Purely data types: nothing here performs I/O, so there is no error
//! type at this layer. `tsdb-wal` and `tsdb-engine` each define the
//! `thiserror` taxonomy for their own fallible operations.

pub mod limits;
pub mod types;

pub use limits::{DEFAULT_RETENTION, DEFAULT_ROTATION_BYTES, DEFAULT_SWEEP_PERIOD};
pub use types::{matches_filters, DataPoint, Tags, Timestamp};
