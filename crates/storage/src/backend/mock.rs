//! In-memory object store for testing.

use crate::backend::ObjectBody;
use crate::error::{ErrorKind, Result};
use crate::{ObjectInfo, ObjectStore};
use async_trait::async_trait;
use std::collections::HashSet;
use std::io::Cursor;
use tokio::sync::RwLock;

/// In-memory object store for testing.
///
/// Holds a single bucket whose objects are listed in insertion order, so tests
/// can check that callers keep the store's order. Failures can be injected for
/// listing and for individual keys, and every [`get`](ObjectStore::get) is
/// recorded.
///
/// # Examples
///
/// ```
/// use logscan_storage::backend::MockStore;
/// use logscan_storage::ObjectStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MockStore::with_objects("archive", [
///     ("jobs/b.log", b"ERROR late".to_vec()),
///     ("jobs/a.log", b"fine".to_vec()),
/// ]);
/// let keys: Vec<_> = store.list("archive", "jobs/").await?.into_iter().map(|o| o.key).collect();
/// assert_eq!(keys, ["jobs/b.log", "jobs/a.log"]);
/// # Ok(())
/// # }
/// ```
pub struct MockStore {
    name: String,
    bucket: String,
    objects: Vec<(String, Vec<u8>)>,
    fail_list: bool,
    fail_get: HashSet<String>,
    fetched: RwLock<Vec<String>>,
}

impl MockStore {
    /// Create a mock store holding `objects` in `bucket`.
    pub fn with_objects(
        bucket: impl Into<String>,
        objects: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>,
    ) -> Self {
        Self {
            name: "mock".to_string(),
            bucket: bucket.into(),
            objects: objects.into_iter().map(|(key, data)| (key.into(), data.into())).collect(),
            fail_list: false,
            fail_get: HashSet::new(),
            fetched: RwLock::new(Vec::new()),
        }
    }

    /// Make every listing fail with a network error.
    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Make fetching `key` fail with a network error (the key is still listed).
    pub fn failing_get(mut self, key: impl Into<String>) -> Self {
        self.fail_get.insert(key.into());
        self
    }

    /// Keys passed to [`get`](ObjectStore::get) so far, in call order.
    pub async fn fetched(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        if self.fail_list {
            exn::bail!(ErrorKind::Network("simulated listing failure".to_string()));
        }
        if bucket != self.bucket {
            exn::bail!(ErrorKind::NoSuchBucket(bucket.to_string()));
        }
        Ok(self
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, data)| ObjectInfo::new(key, data.len() as u64))
            .collect())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        self.fetched.write().await.push(key.to_string());
        if bucket != self.bucket {
            exn::bail!(ErrorKind::NoSuchBucket(bucket.to_string()));
        }
        if self.fail_get.contains(key) {
            exn::bail!(ErrorKind::Network(format!("simulated failure fetching {key}")));
        }
        let (_key, data) =
            self.objects.iter().find(|(k, _)| k == key).ok_or_else(|| ErrorKind::NotFound(key.to_string()))?;
        Ok(Box::new(Cursor::new(data.clone())))
    }
}
