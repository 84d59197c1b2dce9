//! The façade binding WAL, Index, and Retention Sweeper together.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{info, warn};

use tsdb_core::{DataPoint, Tags, Timestamp};
use tsdb_wal::{ReplayStats, WalConfig, WalWriter};

use crate::config::StoreConfig;
use crate::index::Index;
use crate::sweeper::RetentionSweeper;
use crate::time::now_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninitialized,
    Running,
    Closed,
}

/// Why an `insert` was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// `timestamp < now - retention`.
    TooOld,
    /// The metric name was empty.
    EmptyMetric,
    /// The WAL append failed, or the Store isn't running.
    Io,
}

/// Result of [`Store::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Durably recorded and visible to subsequent queries.
    Ok,
    /// No state change; the observation was not recorded.
    Rejected(RejectReason),
}

impl InsertOutcome {
    /// `true` iff this is [`InsertOutcome::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, InsertOutcome::Ok)
    }
}

/// Result of [`Store::initialize`].
#[derive(Debug)]
pub enum InitOutcome {
    /// WAL opened and replay completed; the sweeper is scheduled.
    Ok {
        /// Counts from the replay pass that populated the Index.
        replay: ReplayStats,
    },
    /// The WAL couldn't be opened, or replay hit an unrecoverable I/O
    /// error. The Store remains unusable.
    Failed,
}

/// Result of [`Store::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Sweeper stopped and WAL flushed cleanly.
    Ok,
    /// The WAL failed to flush/close. The Store is considered closed
    /// regardless.
    Failed,
}

/// A point-in-time snapshot of Store size, for operational visibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStats {
    /// Distinct metrics currently indexed.
    pub metric_count: usize,
    /// Total observations currently indexed, across all metrics.
    pub observation_count: usize,
    /// Size in bytes of the active WAL segment.
    pub wal_active_bytes: u64,
    /// Observations appended to the WAL since it was opened.
    pub wal_records_appended: u64,
}

/// The in-process time-series store.
///
/// Lifecycle: `UNINITIALIZED -> (initialize) -> RUNNING -> (shutdown) ->
/// CLOSED`. A `Store` that has been closed does not re-enter
/// `UNINITIALIZED`; construct a fresh `Store` against the same WAL path to
/// reopen it instead.
///
/// All four public operations (`insert`, `query`, `initialize`,
/// `shutdown`) take `&self`: interior mutability (a `Mutex` around the WAL
/// writer and sweeper handle, plus the Index's own lock) is what makes the
/// Store safe to share across threads via `Arc<Store>`.
pub struct Store {
    config: StoreConfig,
    index: Arc<Index>,
    state: Mutex<State>,
    /// Guards the WAL writer. Held for the full append-then-index-insert
    /// critical section of `insert`, so WAL line order always matches the
    /// order observations become visible in the Index — this is the *only*
    /// lock two concurrent inserts contend on; queries never take it.
    wal: Mutex<Option<WalWriter>>,
    sweeper: Mutex<Option<RetentionSweeper>>,
}

impl Store {
    /// Construct a Store in the `UNINITIALIZED` state. Call
    /// [`Store::initialize`] before using it.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            index: Arc::new(Index::new()),
            state: Mutex::new(State::Uninitialized),
            wal: Mutex::new(None),
            sweeper: Mutex::new(None),
        }
    }

    fn cutoff(&self) -> Timestamp {
        now_millis() - self.config.retention.as_millis() as Timestamp
    }

    /// Open the WAL, replay it into the Index, and schedule the Retention
    /// Sweeper. Precondition: not currently initialized (a `Store` that is
    /// already `RUNNING` or `CLOSED` returns `Failed` rather than
    /// re-running initialization).
    pub fn initialize(&self) -> InitOutcome {
        {
            let mut state = self.state.lock();
            if *state != State::Uninitialized {
                return InitOutcome::Failed;
            }
            *state = State::Running; // claim the transition before doing I/O
        }

        let writer = match WalWriter::open(self.config.wal.clone()) {
            Ok(writer) => writer,
            Err(e) => {
                warn!(error = %e, "failed to open WAL");
                *self.state.lock() = State::Closed;
                return InitOutcome::Failed;
            }
        };
        *self.wal.lock() = Some(writer);

        let cutoff = self.cutoff();
        let index = Arc::clone(&self.index);
        let replay = match tsdb_wal::replay_all(&self.config.wal, cutoff, |dp| index.insert(dp)) {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "WAL replay failed");
                *self.wal.lock() = None;
                *self.state.lock() = State::Closed;
                return InitOutcome::Failed;
            }
        };
        info!(
            replayed = replay.replayed,
            expired = replay.expired,
            malformed = replay.malformed,
            "WAL replay complete"
        );

        let sweeper = RetentionSweeper::spawn(
            Arc::clone(&self.index),
            self.config.sweep_period,
            self.config.retention,
        );
        *self.sweeper.lock() = Some(sweeper);

        InitOutcome::Ok { replay }
    }

    /// Insert one observation. Rejects (no state change) a timestamp older
    /// than the retention horizon, or a WAL I/O failure.
    pub fn insert(&self, timestamp: Timestamp, metric: impl Into<String>, value: f64, tags: Tags) -> InsertOutcome {
        if timestamp < self.cutoff() {
            return InsertOutcome::Rejected(RejectReason::TooOld);
        }

        let dp = DataPoint::new(timestamp, metric, value, tags);
        if dp.metric.is_empty() {
            return InsertOutcome::Rejected(RejectReason::EmptyMetric);
        }
        let mut wal = self.wal.lock();
        let Some(writer) = wal.as_mut() else {
            return InsertOutcome::Rejected(RejectReason::Io);
        };

        if let Err(e) = writer.append(&dp) {
            warn!(error = %e, metric = %dp.metric, "WAL append failed, rejecting insert");
            return InsertOutcome::Rejected(RejectReason::Io);
        }

        self.index.insert(dp);
        InsertOutcome::Ok
    }

    /// Insert without going through the WAL. Used by replay (which derives
    /// durability from the WAL it is reading) and by bulk loaders that
    /// supply their own durability path (e.g. the CLI's CSV loader, whose
    /// durability is the CSV file itself). Trusts the caller to have
    /// already applied any retention check it cares about.
    pub fn insert_without_log(&self, dp: DataPoint) {
        self.index.insert(dp);
    }

    /// Observations for `metric` in `[time_start, time_end)` whose tags are
    /// a superset of `filters` (an empty or absent filter set matches
    /// everything). Never fails: an absent metric or a degenerate range
    /// (`time_end <= time_start`) yields an empty list.
    pub fn query(
        &self,
        metric: &str,
        time_start: Timestamp,
        time_end: Timestamp,
        filters: Option<&Tags>,
    ) -> Vec<DataPoint> {
        static EMPTY: std::sync::OnceLock<Tags> = std::sync::OnceLock::new();
        let filters = filters.unwrap_or_else(|| EMPTY.get_or_init(Tags::new));
        self.index.range_scan_filtered(metric, time_start, time_end, filters)
    }

    /// Stop the sweeper and flush/close the WAL. Waits for in-flight
    /// writes to finish (by acquiring the WAL lock) before returning.
    /// Idempotent from the caller's perspective in the sense that calling
    /// it twice never panics, though a second call is a no-op on an
    /// already-`Closed` store.
    pub fn shutdown(&self) -> ShutdownOutcome {
        {
            let mut state = self.state.lock();
            if *state == State::Closed {
                return ShutdownOutcome::Ok;
            }
            *state = State::Closed;
        }

        if let Some(mut sweeper) = self.sweeper.lock().take() {
            sweeper.shutdown();
        }

        let flush_result = self.wal.lock().take().map(|mut writer| writer.flush());
        match flush_result {
            Some(Err(e)) => {
                warn!(error = %e, "WAL failed to flush during shutdown");
                ShutdownOutcome::Failed
            }
            _ => ShutdownOutcome::Ok,
        }
    }

    /// A point-in-time snapshot of store size and WAL usage.
    pub fn stats(&self) -> StoreStats {
        let wal = self.wal.lock();
        let (wal_active_bytes, wal_records_appended) = match wal.as_ref() {
            Some(writer) => (writer.active_size(), writer.counters().records_appended),
            None => (0, 0),
        };
        StoreStats {
            metric_count: self.index.metric_count(),
            observation_count: self.index.observation_count(),
            wal_active_bytes,
            wal_records_appended,
        }
    }

    /// The WAL configuration this Store was constructed with — useful for
    /// the CLI, which opens its own read-only replay over the same path.
    pub fn wal_config(&self) -> &WalConfig {
        &self.config.wal
    }

    /// The retention horizon this Store enforces.
    pub fn retention(&self) -> Duration {
        self.config.retention
    }
}
