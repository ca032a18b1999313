//! Compression Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use crate::Compression;
use derive_more::{Display, Error};
use std::io;

/// A compression error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for compression operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input does not start with the header of the format it was opened as.
    #[display("input is not {_0} data")]
    MissingHeader(#[error(not(source))] Compression),
    /// Data is corrupt or malformed. Don't retry with the same input. Used for reading/decoding.
    #[display("invalid or corrupted data")]
    InvalidData,
    /// The requested format is not supported.
    #[display("unsupported format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// The underlying reader or writer failed, independently of the data.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Classify a failed read through a decoder.
    ///
    /// flate2 and bzip2 report bad or truncated input as `InvalidInput`,
    /// `InvalidData` or `UnexpectedEof`.
    pub(crate) fn from_read_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                Self::InvalidData
            },
            _ => Self::Io,
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}
