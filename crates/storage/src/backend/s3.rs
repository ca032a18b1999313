//! S3-compatible object store.
//!
//! This module provides an object store implementation for S3-compatible
//! services including AWS S3, Backblaze B2, Tigris (Fly.io), MinIO and others.
//!
//! # Credentials
//!
//! A static key pair from the configuration wins. Without one the AWS SDK
//! default chain is used (`AWS_*` variables, the shared config and
//! credentials files, SSO, instance and container roles), optionally reading
//! a named profile from a non-default credentials file.

use crate::backend::ObjectBody;
use crate::error::{ErrorKind, Result};
use crate::{ObjectInfo, ObjectStore};
use async_trait::async_trait;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, retry::RetryConfig},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::Object,
};
use std::fmt::Debug;
use std::path::PathBuf;
use tokio_util::io::SyncIoBridge;

/// Everything needed to reach one S3-compatible service.
///
/// Unset fields are left to the AWS SDK's own resolution.
#[derive(Clone, Default)]
pub struct S3Connection {
    /// AWS region or provider-specific region (e.g. "us-west-004" for Backblaze).
    pub region: Option<String>,
    /// Custom endpoint URL for S3-compatible services.
    pub endpoint: Option<String>,
    /// Static access key ID and secret.
    pub access_key: Option<(String, String)>,
    /// Profile to read from the AWS shared config and credentials files.
    pub profile: Option<String>,
    /// Credentials file to read instead of `~/.aws/credentials`.
    pub profile_file: Option<PathBuf>,
}

/// S3-compatible object store.
///
/// # Listing
///
/// By default [`list`](ObjectStore::list) sends exactly one `ListObjectsV2`
/// request, so at most 1000 keys come back (the service's page size). Turn on
/// [`with_pagination`](Self::with_pagination) to follow continuation tokens
/// until every matching key has been listed.
///
/// # Examples
///
/// ```no_run
/// use logscan_storage::backend::{S3Connection, S3Store};
///
/// # async fn example() {
/// let connection = S3Connection {
///     region: Some("us-west-004".to_string()),
///     endpoint: Some("https://s3.us-west-004.backblazeb2.com".to_string()),
///     access_key: Some(("access_key_id".to_string(), "secret_access_key".to_string())),
///     ..S3Connection::default()
/// };
/// let store = S3Store::connect("b2", connection).await.with_pagination(true);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct S3Store {
    name: String,
    client: Client,
    paginate: bool,
}

impl S3Store {
    /// Resolve the SDK configuration for `connection` and build a client
    /// from it.
    ///
    /// Nothing is sent over the network here; missing credentials surface
    /// on the first request.
    pub async fn connect(name: impl Into<String>, connection: S3Connection) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = connection.region {
            loader = loader.region(Region::new(region));
        }
        if let Some(profile) = &connection.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(file) = connection.profile_file {
            let files = ProfileFiles::builder()
                .include_default_config_file(true)
                .with_file(ProfileFileKind::Credentials, file)
                .build();
            loader = loader.profile_files(files);
        }
        if let Some((key_id, key_secret)) = connection.access_key {
            loader = loader.credentials_provider(Credentials::new(key_id, key_secret, None, None, "logscan-config"));
        }
        // Set custom endpoint for non-AWS services
        if let Some(endpoint_url) = connection.endpoint {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;
        let config = aws_sdk_s3::config::Builder::from(&sdk_config)
            // Configure retry policy with exponential backoff (1 initial + 3 retries)
            .retry_config(RetryConfig::standard().with_max_attempts(4))
            // Use path-style addressing for better compatibility with
            // S3-compatible services (Backblaze, MinIO, etc.)
            .force_path_style(true)
            .build();
        Self::from_client(name, Client::from_conf(config))
    }

    /// Wrap an already configured client.
    pub fn from_client(name: impl Into<String>, client: Client) -> Self {
        Self {
            name: name.into(),
            client,
            paginate: false,
        }
    }

    /// Follow continuation tokens when listing instead of stopping after the
    /// first page.
    pub fn with_pagination(mut self, paginate: bool) -> Self {
        self.paginate = paginate;
        self
    }

    fn object_info(object: &Object) -> Option<ObjectInfo> {
        let key = object.key()?;
        let size = object.size().and_then(|s| u64::try_from(s).ok()).unwrap_or(0);
        Some(ObjectInfo::new(key, size))
    }

    /// Map SDK failures that aren't specific to one operation.
    fn map_sdk_error<E, R>(err: SdkError<E, R>, location: &str) -> ErrorKind
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: Debug,
    {
        let detail = DisplayErrorContext(&err).to_string();
        match &err {
            SdkError::ServiceError(context) => match context.err().code() {
                Some("NoSuchBucket") => ErrorKind::NoSuchBucket(location.to_string()),
                Some("AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch") => {
                    ErrorKind::PermissionDenied(format!("{location}: {detail}"))
                },
                _ => ErrorKind::BackendError(detail),
            },
            SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) | SdkError::ResponseError(_) => {
                ErrorKind::Network(detail)
            },
            _ => ErrorKind::BackendError(detail),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_prefix((!prefix.is_empty()).then(|| prefix.to_string()))
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|err| {
                    if err.as_service_error().is_some_and(|e| e.is_no_such_bucket()) {
                        return ErrorKind::NoSuchBucket(bucket.to_string());
                    }
                    Self::map_sdk_error(err, bucket)
                })?;
            objects.extend(output.contents().iter().filter_map(Self::object_info));
            match output.next_continuation_token() {
                Some(token) if self.paginate => continuation = Some(token.to_string()),
                Some(_) => {
                    tracing::warn!(
                        store = %self.name,
                        bucket,
                        prefix,
                        listed = objects.len(),
                        "Listing truncated after the first page; enable pagination to scan every object"
                    );
                    break;
                },
                None => break,
            }
        }
        tracing::debug!(store = %self.name, bucket, prefix, count = objects.len(), "Listed S3 bucket");
        Ok(objects)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        let output = self.client.get_object().bucket(bucket).key(key).send().await.map_err(|err| {
            if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                return ErrorKind::NotFound(key.to_string());
            }
            Self::map_sdk_error(err, &format!("{bucket}/{key}"))
        })?;
        tracing::debug!(store = %self.name, bucket, key, size = ?output.content_length(), "Opened S3 object");
        // Reads block on the runtime handle captured here, so the body must
        // be consumed from a blocking thread.
        Ok(Box::new(SyncIoBridge::new(Box::pin(output.body.into_async_read()))))
    }
}
