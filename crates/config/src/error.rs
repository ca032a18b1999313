//! Configuration Error Types

use derive_more::{Display, Error};

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested config file does not exist.
    #[display("config file not found: {_0}")]
    MissingFile(#[error(not(source))] String),
    /// The config file extension is not one of toml, yaml, yml or json.
    #[display("unsupported config file format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// The merged configuration could not be deserialized.
    #[display("invalid configuration")]
    Parse,
    #[display("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
    #[display("no store profile named {_0:?}")]
    UnknownProfile(#[error(not(source))] String),
    /// A profile carries only one half of a static key pair.
    #[display("store profile {profile:?} is missing {field}")]
    MissingField { profile: String, field: &'static str },
}

impl ErrorKind {
    /// Configuration errors need a human to fix the file or the flags.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
