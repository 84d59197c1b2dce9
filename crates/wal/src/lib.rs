//! Append-only, line-oriented write-ahead log for tagged observations.
//!
//! - [`record`]: the text codec for one line (`encode`/`decode`).
//! - [`writer`]: [`WalWriter`], which appends and rotates by size.
//! - [`reader`]: streaming replay with a retention cutoff.
//! - [`segments`]: discovery of rotated sibling files.
//! - [`config`]: [`WalConfig`] (path + rotation threshold).

pub mod config;
pub mod error;
pub mod reader;
pub mod record;
pub mod segments;
pub mod writer;

pub use config::WalConfig;
pub use error::{Result, WalError};
pub use reader::{replay_all, replay_file, ReplayStats};
pub use writer::{WalCounters, WalWriter};
