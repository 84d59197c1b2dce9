//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bulk-load, query, and inspect a tsdb WAL directory from the command
/// line. Single-shot only: there is no interactive shell.
#[derive(Debug, Parser)]
#[command(name = "tsdb", about = "tsdb WAL bulk loader and query tool")]
pub struct Cli {
    /// Directory containing `timeseries.log` and any rotated siblings.
    #[arg(long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Emit machine-readable JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Bulk-load observations from a header-bearing CSV file.
    ///
    /// The first three columns must be timestamp (integer milliseconds),
    /// metric (non-empty string), and value (float). Every remaining
    /// column is treated as a tag, named by its header; empty cells are
    /// omitted rather than stored as empty-string tag values.
    Load {
        /// Path to the CSV file to load.
        csv: PathBuf,
    },
    /// Query observations for one metric over a half-open time range.
    Query {
        /// Metric name to query.
        metric: String,
        /// Inclusive start of the range, in epoch milliseconds.
        start: i64,
        /// Exclusive end of the range, in epoch milliseconds.
        end: i64,
        /// Tag filter as `key=value`; repeatable. An observation must
        /// match every filter given.
        #[arg(long = "tag", value_name = "KEY=VALUE")]
        tags: Vec<String>,
    },
    /// Report the active segment size and rotated siblings, without
    /// touching the Index.
    WalInfo,
}
