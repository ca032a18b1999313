//! Decompression for log objects fetched from storage.
//!
//! Log archives are usually a mix of plain text and compressed files. This
//! crate decides which decoder an object needs and hands back a plain
//! [`Read`](std::io::Read)er over its decoded bytes:
//!
//! - **Selection** from an object key's suffix ([`Compression::from_key`]),
//!   optionally overridden for a whole run ([`Selector`])
//! - **Eager decoding** via [`Compression::open`]: the decoder is made to
//!   read its header before returning, so a file that merely *claims* to be
//!   compressed fails up front instead of halfway through a scan
//! - **In-memory** compression ([`Compression::compress`]), mostly useful for
//!   building fixtures
//!
//! Gzip and Bzip2 are supported. Anything else is treated as plain text.

mod construct;
pub mod error;
mod ops;
mod probe;
mod select;
mod util;

pub use crate::select::Selector;

/// A supported compression format.
///
/// Defaults to [`None`](Self::None) (uncompressed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    #[default]
    None,
    /// Bzip2 compression (.bz2)
    Bzip2,
    /// Gzip compression (.gz)
    Gzip,
}
