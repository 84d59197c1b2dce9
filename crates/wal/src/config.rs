//! WAL placement and rotation configuration.

use std::path::{Path, PathBuf};
use tsdb_core::DEFAULT_ROTATION_BYTES;

/// Where the WAL lives and when it rotates.
///
/// [`WalConfig::default`] is a file named `timeseries.log` in the current
/// working directory, rotating at 50 MiB. Tests construct a `WalConfig`
/// pointed at a `tempfile::TempDir` instead, so a global-CWD default stays
/// overridable for deterministic tests.
#[derive(Debug, Clone)]
pub struct WalConfig {
    /// Directory containing the active segment and any rotated siblings.
    pub dir: PathBuf,
    /// File name of the active segment within `dir`.
    pub file_name: String,
    /// Size, in bytes, at which the active segment rotates.
    pub rotation_bytes: u64,
}

impl WalConfig {
    /// A WAL rooted at `dir`, using the default file name and rotation
    /// threshold.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_name: "timeseries.log".to_string(),
            rotation_bytes: DEFAULT_ROTATION_BYTES,
        }
    }

    /// Path to the active segment.
    pub fn active_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Directory the WAL lives in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for WalConfig {
    /// `<working-directory>/timeseries.log`.
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
