use derive_more::{Display, Error};
use logscan_scan::error::ErrorKind as ScanErrorKind;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level failure, with the detailed cause attached as a child.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not set up object store")]
    Store,
    #[display("scan aborted{}", key.as_deref().map(|key| format!(" at object {key}")).unwrap_or_default())]
    Scan { key: Option<String> },
}

impl ErrorKind {
    /// Wrap a scan failure, naming the object it happened on.
    pub fn scan(cause: &ScanErrorKind) -> Self {
        Self::Scan {
            key: cause.key().map(str::to_string),
        }
    }
}
