//! Discovery of rotated WAL siblings.
//!
//! A rotated file is named `<stem>_<millis>.log`, where `<stem>` is the
//! active segment's file name without its extension (`timeseries` for the
//! default `timeseries.log`) and `<millis>` is the wall-clock time the
//! rotation happened, in milliseconds since the Unix epoch.

use crate::config::WalConfig;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

fn stem_of(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("timeseries")
}

/// Parse `<stem>_<millis>.log` into `millis`, if `name` matches the pattern
/// for the given `stem`.
fn parse_rotation_millis(name: &str, stem: &str) -> Option<u64> {
    let rest = name.strip_prefix(stem)?.strip_prefix('_')?;
    let millis_str = rest.strip_suffix(".log")?;
    millis_str.parse().ok()
}

/// List every rotated sibling of the WAL at `config`, sorted ascending by
/// rotation time (oldest first). The active segment itself is never
/// included.
pub fn list_rotated(config: &WalConfig) -> io::Result<Vec<PathBuf>> {
    let stem = stem_of(&config.file_name);
    let mut found: Vec<(u64, PathBuf)> = Vec::new();

    if !config.dir.exists() {
        return Ok(Vec::new());
    }

    for entry in std::fs::read_dir(&config.dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(millis) = parse_rotation_millis(name, stem) {
            found.push((millis, entry.path()));
        }
    }

    found.sort_by_key(|(millis, _)| *millis);
    Ok(found.into_iter().map(|(_, path)| path).collect())
}
