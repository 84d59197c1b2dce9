//! Compile-time constants governing retention and rotation.
//!
//! These are the fixed defaults. [`crate::config`] (in `tsdb-engine`) lets
//! callers override them per-instance for testing; nothing here prevents
//! that — these are merely the values a fresh `Default` config carries.

use std::time::Duration;

/// Observations older than this (by wall-clock age) are never admitted or
/// retained.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Interval between Retention Sweeper passes.
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Size threshold, in bytes, at which the active WAL segment rotates.
pub const DEFAULT_ROTATION_BYTES: u64 = 50 * 1024 * 1024;
