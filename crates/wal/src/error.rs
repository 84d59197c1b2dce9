//! Error type for WAL I/O.

use std::io;
use thiserror::Error;

/// Result alias for WAL operations.
pub type Result<T> = std::result::Result<T, WalError>;

/// Errors raised by WAL append, replay, or rotation.
///
/// Malformed individual records are *not* represented here — replay skips
/// them with a `tracing::warn!` and keeps going (see [`crate::reader`]).
/// This type covers only failures that prevent the WAL from being used at
/// all: the underlying file couldn't be opened, written, or rotated.
#[derive(Debug, Error)]
pub enum WalError {
    /// The active segment or a rotated sibling could not be read, written,
    /// or renamed.
    #[error("WAL I/O error: {0}")]
    Io(#[from] io::Error),
}
