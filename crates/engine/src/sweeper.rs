//! Background Retention Sweeper.
//!
//! A dedicated thread, woken on a fixed period, observing an `AtomicBool`
//! shutdown flag in short sleep increments so `shutdown` doesn't have to
//! wait out a full period.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

use crate::index::Index;
use crate::time::now_millis;

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Periodic background eviction of observations older than the retention
/// horizon.
pub struct RetentionSweeper {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RetentionSweeper {
    /// Spawn the sweeper thread. The first pass fires after `period`, not
    /// immediately.
    pub fn spawn(index: Arc<Index>, period: Duration, retention: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_for_thread = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("tsdb-retention-sweeper".to_string())
            .spawn(move || sweep_loop(index, period, retention, shutdown_for_thread))
            .expect("failed to spawn retention sweeper thread");

        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Signal the sweeper to stop and block until its thread exits.
    /// Idempotent: a second call is a no-op.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RetentionSweeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn sweep_loop(index: Arc<Index>, period: Duration, retention: Duration, shutdown: Arc<AtomicBool>) {
    loop {
        if !sleep_respecting_shutdown(period, &shutdown) {
            return;
        }
        run_one_pass(&index, retention);
    }
}

/// Sleep for `total`, checking `shutdown` every [`SHUTDOWN_POLL_INTERVAL`].
/// Returns `false` if shutdown was observed during the sleep.
fn sleep_respecting_shutdown(total: Duration, shutdown: &AtomicBool) -> bool {
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let step = SHUTDOWN_POLL_INTERVAL.min(total - elapsed);
        thread::sleep(step);
        elapsed += step;
    }
    !shutdown.load(Ordering::Relaxed)
}

fn run_one_pass(index: &Index, retention: Duration) {
    let cutoff = now_millis() - retention.as_millis() as i64;
    let removed = index.prune_older_than(cutoff);
    if removed > 0 {
        debug!(removed, cutoff, "retention sweep evicted expired observations");
    }
}
