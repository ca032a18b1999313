//! Object store trait and implementations.
//!
//! This module defines the [`ObjectStore`] trait, the only thing a scan
//! needs from storage: list a bucket under a prefix, and open one object for
//! reading. Implementations exist for S3-compatible services and for a plain
//! directory on disk.

mod local;
#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "s3")]
mod s3;

pub use self::local::LocalStore;
#[cfg(feature = "mock")]
pub use self::mock::MockStore;
#[cfg(feature = "s3")]
pub use self::s3::{S3Connection, S3Store};
use crate::ObjectInfo;
use crate::error::Result;
use async_trait::async_trait;
use std::io::Read;

/// An opened, sequential, read-once handle on an object's raw bytes.
///
/// `'static` and [`Send`] so it can be moved into
/// [`spawn_blocking`](tokio::task::spawn_blocking); dropping it releases the
/// underlying file or connection.
pub type ObjectBody = Box<dyn Read + Send + 'static>;

/// Read-only access to a bucket/key addressed blob store.
///
/// All operations are asynchronous because the main implementation talks to
/// S3 over the network. The bodies returned by [`get`](Self::get) are plain
/// sync [`Read`]ers: decoding and line splitting are blocking work.
///
/// # Examples
///
/// ```
/// use logscan_storage::{ObjectStore, error::Result};
///
/// async fn total_size(store: &dyn ObjectStore, bucket: &str, prefix: &str) -> Result<u64> {
///     let objects = store.list(bucket, prefix).await?;
///     Ok(objects.iter().map(|o| o.size).sum())
/// }
/// ```
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the configured store (used for logging only).
    fn name(&self) -> &str;

    /// List objects in `bucket` whose key starts with `prefix`.
    ///
    /// Keys are returned in the store's own listing order and the caller
    /// should not assume anything beyond that. An empty prefix lists the
    /// whole bucket.
    ///
    /// # Notes
    /// - `prefix` is a plain string prefix, not a directory: `logs/app`
    ///   matches both `logs/app.log` and `logs/app/1.log`.
    /// - Whether one call returns *every* matching object depends on the
    ///   implementation; see `S3Store::with_pagination`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use logscan_storage::{ObjectStore, error::Result};
    /// # async fn example(store: &dyn ObjectStore) -> Result<()> {
    /// for object in store.list("archive", "jobs/2024-03/").await? {
    ///     println!("{}: {} bytes", object.key, object.size);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>>;

    /// Open an object for streaming reads.
    ///
    /// The async setup (opening the file or sending the request) happens
    /// before returning; reading the body is blocking and should happen
    /// inside [`spawn_blocking`](tokio::task::spawn_blocking). Returns
    /// [`NotFound`](crate::error::ErrorKind::NotFound) if the object does
    /// not exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use logscan_storage::{ObjectStore, error::Result};
    /// # async fn example(store: &dyn ObjectStore) -> Result<()> {
    /// let mut body = store.get("archive", "jobs/2024-03/run.log").await?;
    /// let bytes = tokio::task::spawn_blocking(move || {
    ///     let mut buf = Vec::new();
    ///     std::io::Read::read_to_end(&mut body, &mut buf).map(|_| buf)
    /// }).await.unwrap();
    /// # Ok(())
    /// # }
    /// ```
    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectBody>;
}
