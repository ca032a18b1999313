//! Named S3 store profiles.

use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One `[profiles.<name>]` table. Every field is optional on disk so that
/// parts of a profile can come from the file and parts from the environment.
///
/// A profile without `key_id`/`key_secret` authenticates through the AWS
/// default credential chain (`AWS_*` variables, `~/.aws/credentials`,
/// instance roles), optionally narrowed to `aws_profile`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProfile {
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services (Backblaze, MinIO, ...).
    pub endpoint: Option<String>,
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    /// Profile name in the AWS shared config and credentials files.
    pub aws_profile: Option<String>,
    /// Credentials file to read instead of `~/.aws/credentials`.
    pub aws_profile_file: Option<PathBuf>,
}

impl fmt::Debug for StoreProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreProfile")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("key_id", &self.key_id)
            .field("key_secret", &self.key_secret.as_ref().map(|_| "<redacted>"))
            .field("aws_profile", &self.aws_profile)
            .field("aws_profile_file", &self.aws_profile_file)
            .finish()
    }
}

/// Command line values that take precedence over the selected profile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreOverrides {
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub aws_profile: Option<String>,
    pub aws_profile_file: Option<PathBuf>,
}

/// A static access key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey {
    pub id: String,
    pub secret: String,
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Validated S3 connection settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct S3Settings {
    /// Name of the profile these came from.
    pub name: String,
    /// `None` leaves the region to the AWS SDK (`AWS_REGION`, shared config).
    pub region: Option<String>,
    pub endpoint: Option<String>,
    /// `None` uses the AWS SDK default credential chain.
    pub access_key: Option<AccessKey>,
    pub aws_profile: Option<String>,
    pub aws_profile_file: Option<PathBuf>,
}

impl StoreProfile {
    /// Apply command line overrides and check the key pair is complete.
    ///
    /// Both key halves or neither: half a static key pair is a mistake, not
    /// a request for the default credential chain.
    pub fn resolve(&self, name: &str, overrides: &StoreOverrides) -> Result<S3Settings> {
        let missing = |field| ErrorKind::MissingField {
            profile: name.to_string(),
            field,
        };
        let access_key = match (&self.key_id, &self.key_secret) {
            (Some(id), Some(secret)) => Some(AccessKey {
                id: id.clone(),
                secret: secret.clone(),
            }),
            (None, None) => None,
            (Some(_), None) => exn::bail!(missing("key_secret")),
            (None, Some(_)) => exn::bail!(missing("key_id")),
        };
        Ok(S3Settings {
            name: name.to_string(),
            region: overrides.region.clone().or_else(|| self.region.clone()),
            endpoint: overrides.endpoint.clone().or_else(|| self.endpoint.clone()),
            access_key,
            aws_profile: overrides.aws_profile.clone().or_else(|| self.aws_profile.clone()),
            aws_profile_file: overrides.aws_profile_file.clone().or_else(|| self.aws_profile_file.clone()),
        })
    }
}
