//! Append-only WAL writer with size-based rotation.

use crate::config::WalConfig;
use crate::error::Result;
use crate::record;
use crate::segments;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;
use tsdb_core::DataPoint;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Running totals exposed through [`crate::WalWriter::counters`], used by
/// the engine's `Store::stats()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalCounters {
    /// Observations successfully appended since this writer was opened.
    pub records_appended: u64,
    /// Bytes written to the active segment since this writer was opened
    /// (does not include bytes written to segments rotated away).
    pub bytes_written: u64,
    /// Number of rotations performed since this writer was opened.
    pub rotations: u64,
}

/// Writes observations to the active WAL segment, rotating to a new
/// segment once the active one reaches [`WalConfig::rotation_bytes`].
///
/// `append` is not internally synchronized: WAL appends are serialized
/// under the Index's write guard (see `tsdb-engine::store`), so a single
/// `&mut WalWriter` is always accessed from one logical writer at a time.
pub struct WalWriter {
    config: WalConfig,
    file: BufWriter<File>,
    active_size: u64,
    counters: WalCounters,
}

impl WalWriter {
    /// Open (creating if absent) the active segment named by `config`.
    pub fn open(config: WalConfig) -> Result<Self> {
        fs::create_dir_all(&config.dir)?;
        let path = config.active_path();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let active_size = file.metadata()?.len();
        Ok(Self {
            config,
            file: BufWriter::new(file),
            active_size,
            counters: WalCounters::default(),
        })
    }

    /// Append one record, rotating first if the active segment has grown
    /// past the configured threshold. Flushes and fsyncs before returning
    /// so the record is durable the instant this call succeeds.
    pub fn append(&mut self, dp: &DataPoint) -> Result<()> {
        self.rotate_if_needed()?;

        let line = record::encode(dp);
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.file.get_ref().sync_data()?;

        self.active_size += line.len() as u64;
        self.counters.records_appended += 1;
        self.counters.bytes_written += line.len() as u64;
        Ok(())
    }

    fn rotate_if_needed(&mut self) -> Result<()> {
        if self.active_size < self.config.rotation_bytes {
            return Ok(());
        }
        self.rotate()
    }

    fn rotate(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.get_ref().sync_data()?;

        let stem = std::path::Path::new(&self.config.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("timeseries");
        let rotated_path: PathBuf = self
            .config
            .dir
            .join(format!("{}_{}.log", stem, now_millis()));
        let active_path = self.config.active_path();

        fs::rename(&active_path, &rotated_path)?;

        let file = OpenOptions::new().create(true).append(true).open(&active_path)?;
        self.file = BufWriter::new(file);
        self.active_size = 0;
        self.counters.rotations += 1;
        Ok(())
    }

    /// Flush buffered bytes without forcing a rotation check.
    pub fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }

    /// Rotated siblings, oldest first. Used by replay and by `tsdb-cli
    /// wal-info`.
    pub fn list_segments(&self) -> std::io::Result<Vec<PathBuf>> {
        segments::list_rotated(&self.config)
    }

    /// Running counters since this writer was opened.
    pub fn counters(&self) -> WalCounters {
        self.counters
    }

    /// Current size of the active segment, in bytes.
    pub fn active_size(&self) -> u64 {
        self.active_size
    }

    /// The configuration this writer was opened with.
    pub fn config(&self) -> &WalConfig {
        &self.config
    }
}

impl Drop for WalWriter {
    fn drop(&mut self) {
        if let Err(e) = self.file.flush() {
            warn!("failed to flush WAL on drop: {e}");
        }
    }
}
