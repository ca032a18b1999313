//! Per-run decoder selection.

use crate::Compression;
use crate::error::Error;
use std::str::FromStr;

/// How a scan decides which decoder each object needs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Selector {
    /// Pick the decoder from the object key's suffix (`.gz`, `.bz2`).
    #[default]
    BySuffix,
    /// Decode every object as this format regardless of its key. Useful for
    /// buckets where archives were uploaded without a suffix.
    Always(Compression),
}
impl Selector {
    pub fn resolve(&self, key: &str) -> Compression {
        match self {
            Self::BySuffix => Compression::from_key(key),
            Self::Always(format) => *format,
        }
    }
}
impl FromStr for Selector {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "auto" | "suffix" => Ok(Self::BySuffix),
            other => Ok(Self::Always(Compression::from_str(other)?)),
        }
    }
}
