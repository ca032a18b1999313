//! Key validation for stores backed by a filesystem.
//!
//! Object keys are free-form strings, but once a key is turned into a path
//! under a local root it must not be able to escape that root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates an object key (or bucket name) and turns it into a relative path.
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidKey`](crate::error::ErrorKind::InvalidKey)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use logscan_storage::validate_key;
/// // Valid keys
/// assert!(validate_key("logs/2024/app.log.gz").is_ok());
/// assert!(validate_key("a/../app.log").is_ok()); // (never leaves the bucket)
/// // Invalid keys
/// assert!(validate_key("../etc/passwd").is_err());
/// assert!(validate_key("a/../../b").is_err()); // (leaves the bucket)
/// assert!(validate_key("a\0b").is_err());
/// // Keys get resolved
/// assert_eq!(
///     validate_key("wrong/../logs/.//app.log/").unwrap(),
///     Path::new("logs/app.log")
/// );
/// ```
pub fn validate(key: &str) -> Result<PathBuf> {
    let invalid = || ErrorKind::InvalidKey(key.to_string());
    let mut components = Vec::new();
    for component in Path::new(key).components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(invalid());
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(invalid()),
        false => Ok(components.into_iter().collect()),
    }
}
