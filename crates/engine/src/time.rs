//! Wall-clock time as milliseconds since the Unix epoch.

use std::time::{SystemTime, UNIX_EPOCH};
use tsdb_core::Timestamp;

/// `now()` in the unit the WAL and Index use throughout.
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_millis() as Timestamp
}
