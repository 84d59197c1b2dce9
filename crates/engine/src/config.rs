//! Store configuration.

use std::path::PathBuf;
use std::time::Duration;
use tsdb_core::{DEFAULT_RETENTION, DEFAULT_SWEEP_PERIOD};
use tsdb_wal::WalConfig;

/// Everything a [`crate::Store`] needs to open: where the WAL lives, how
/// old data may get before it's rejected/evicted, and how often the
/// sweeper runs.
///
/// The retention horizon and sweep period default to fixed constants;
/// [`StoreConfig::default`] uses exactly those, but the fields remain
/// public and overridable so tests don't have to wait out a real 24-hour
/// horizon or a real 60-second sweep (see `DESIGN.md`).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// WAL placement and rotation threshold.
    pub wal: WalConfig,
    /// Observations older than `now - retention` are rejected on insert
    /// and evicted by the sweeper.
    pub retention: Duration,
    /// Interval between Retention Sweeper passes.
    pub sweep_period: Duration,
}

impl StoreConfig {
    /// A config rooted at `dir`, using the default retention and sweep
    /// period.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            wal: WalConfig::new(dir),
            retention: DEFAULT_RETENTION,
            sweep_period: DEFAULT_SWEEP_PERIOD,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            wal: WalConfig::default(),
            retention: DEFAULT_RETENTION,
            sweep_period: DEFAULT_SWEEP_PERIOD,
        }
    }
}
