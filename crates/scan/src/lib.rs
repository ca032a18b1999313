//! Streaming error-line scanner for logs held in object storage.
//!
//! A scan walks every object under a bucket prefix, strictly one at a time
//! and in listing order:
//!
//! 1. the object body is staged into a temporary file ([`scan_object`]),
//! 2. decoded according to its key ([`Selector`](logscan_compress::Selector)),
//! 3. split into lines, each one classified by [`is_error`],
//! 4. and fed through a [`ContextWindow`] that decides what gets printed:
//!    every error line (announced by a `key:<object key>` line) plus the
//!    lines that follow it.
//!
//! The first failure of any kind aborts the whole walk; see
//! [`ErrorKind`](crate::error::ErrorKind).

mod classify;
pub mod error;
mod object;
mod options;
mod walk;
mod window;

pub use crate::classify::{ERROR_MARKER, SUPPRESSION_MARKERS, is_error};
pub use crate::object::{ObjectReport, scan_object};
pub use crate::options::{DEFAULT_CONTEXT_LINES, ScanOptions};
pub use crate::walk::{WalkSummary, walk};
pub use crate::window::{ContextWindow, Emit, Emitter};
