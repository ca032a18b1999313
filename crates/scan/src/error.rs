//! Scan Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Storage and compression failures
//! are kept as children of the scan error that names the affected object.

use derive_more::{Display, Error};

/// A scan error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Where a scan failed. Every kind is fatal for the whole run.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Listing the bucket/prefix failed; nothing was scanned.
    #[display("failed to list objects in bucket {bucket:?} under prefix {prefix:?}")]
    Enumeration { bucket: String, prefix: String },
    /// Fetching an object from the store failed.
    #[display("failed to fetch object {_0}")]
    Retrieval(#[error(not(source))] String),
    /// The local temporary copy of an object could not be created or written.
    #[display("failed to stage object {_0} on disk")]
    Staging(#[error(not(source))] String),
    /// The object could not be opened with the decoder its key selected.
    #[display("failed to decode object {_0}")]
    Decode(#[error(not(source))] String),
    /// Reading lines failed after the object was opened.
    #[display("failed to read object {_0}")]
    Read(#[error(not(source))] String),
    /// Writing results failed (e.g. stdout was closed).
    #[display("failed to write scan output")]
    Output,
    /// The blocking task scanning an object panicked or was cancelled.
    #[display("scan task for object {_0} did not complete")]
    Task(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// The scan itself never retries; this is a hint for whoever re-runs it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Enumeration { .. } | Self::Retrieval(_) | Self::Staging(_))
    }

    /// The object this error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Retrieval(key) | Self::Staging(key) | Self::Decode(key) | Self::Read(key) | Self::Task(key) => {
                Some(key)
            },
            Self::Enumeration { .. } | Self::Output => None,
        }
    }
}
