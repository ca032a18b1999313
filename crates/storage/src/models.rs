/// An object found by listing a bucket.
///
/// One per stored object; only lives as long as the listing that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Full object key, including any prefix
    pub key: String,
    /// Object size in bytes
    pub size: u64,
}
impl ObjectInfo {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self { key: key.into(), size }
    }
}
