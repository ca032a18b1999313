//! Local filesystem object store.
//!
//! Treats a directory as an object store: every subdirectory of the root is a
//! bucket, and every regular file below a bucket is an object whose key is its
//! `/`-separated path relative to that bucket. Handy for scanning an archive
//! that has already been synced down with `aws s3 sync`.

use crate::backend::ObjectBody;
use crate::error::ErrorKind;
use crate::{ObjectInfo, ObjectStore, error::Result, path::validate as validate_key};
use async_trait::async_trait;
use exn::ResultExt;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, DirEntry};

enum WalkEntry {
    Object(ObjectInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem object store.
///
/// # Examples
///
/// ```no_run
/// use logscan_storage::backend::LocalStore;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Objects of bucket "archive" live under /srv/mirror/archive/
/// let store = LocalStore::new("mirror", "/srv/mirror")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalStore {
    name: String,
    /// Directory containing one subdirectory per bucket
    root: PathBuf,
}
impl LocalStore {
    /// Create a new local object store.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not absolute or is not an existing
    /// directory. Unlike a writable library, a scan never creates its root.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let display = root.display().to_string();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidKey(display));
        }
        if !root.is_dir() {
            exn::bail!(ErrorKind::NotFound(display));
        }
        Ok(Self { name: name.into(), root })
    }

    /// Directory holding the objects of `bucket`.
    ///
    /// A bucket name must be exactly one path component.
    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        let validated = validate_key(bucket)?;
        if validated.components().count() != 1 {
            exn::bail!(ErrorKind::InvalidKey(bucket.to_string()));
        }
        Ok(self.root.join(validated))
    }

    /// Convert a file below `bucket_dir` into its object key.
    fn key_for(bucket_dir: &Path, absolute: &Path) -> Result<String> {
        let relative = absolute.strip_prefix(bucket_dir).or_raise(|| {
            ErrorKind::BackendError(format!("path `{:?}` is not within bucket `{:?}`", absolute, bucket_dir))
        })?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(s) => segments.push(
                    s.to_str().ok_or_else(|| ErrorKind::InvalidKey(relative.to_string_lossy().into_owned()))?,
                ),
                _ => exn::bail!(ErrorKind::InvalidKey(relative.to_string_lossy().into_owned())),
            }
        }
        Ok(segments.join("/"))
    }

    fn map_io_error(e: std::io::Error, what: &str) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(what.to_string()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(what.to_string()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Symlinks to files are followed; symlinked directories are not, so a
    /// link pointing back up the tree can't loop the walk. Broken links are
    /// skipped.
    async fn process_entry(bucket_dir: &Path, entry: DirEntry, prefix: &str) -> Result<WalkEntry> {
        let path = entry.path();
        let map_err = |e| Self::map_io_error(e, &path.to_string_lossy());
        let file_type = entry.file_type().await.map_err(map_err)?;
        if file_type.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if file_type.is_symlink() && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Skipping broken symlink");
                return Ok(WalkEntry::Skip);
            },
            Err(e) => return Err(map_err(e).into()),
        };
        if !metadata.is_file() {
            return Ok(WalkEntry::Skip);
        }
        let key = Self::key_for(bucket_dir, &path)?;
        if !key.starts_with(prefix) {
            return Ok(WalkEntry::Skip);
        }
        Ok(WalkEntry::Object(ObjectInfo::new(key, metadata.len())))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn name(&self) -> &str {
        &self.name
    }

    /// Walks the whole bucket directory and keeps files whose key starts with
    /// `prefix`. Results are sorted by key, the same order S3 lists in.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let bucket_dir = self.bucket_dir(bucket)?;
        if !fs::try_exists(&bucket_dir).await.map_err(ErrorKind::Io)? {
            exn::bail!(ErrorKind::NoSuchBucket(bucket.to_string()));
        }
        let mut objects = Vec::new();
        let mut stack = vec![bucket_dir.clone()];
        while let Some(current) = stack.pop() {
            let mut entries =
                fs::read_dir(&current).await.map_err(|e| Self::map_io_error(e, &current.to_string_lossy()))?;
            while let Some(entry) =
                entries.next_entry().await.map_err(|e| Self::map_io_error(e, &current.to_string_lossy()))?
            {
                match Self::process_entry(&bucket_dir, entry, prefix).await? {
                    WalkEntry::Object(object) => objects.push(object),
                    WalkEntry::Descend(dir) => stack.push(dir),
                    WalkEntry::Skip => {},
                }
            }
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        tracing::debug!(store = %self.name, bucket, prefix, count = objects.len(), "Listed local bucket");
        Ok(objects)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        let path = self.bucket_dir(bucket)?.join(validate_key(key)?);
        let file = fs::File::open(&path).await.map_err(|e| Self::map_io_error(e, key))?;
        Ok(Box::new(file.into_std().await))
    }
}
