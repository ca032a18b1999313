//! Layered configuration for logscan.
//!
//! Values are merged, later layers winning:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. the config file (TOML, YAML or JSON, picked by extension),
//! 3. `LOGSCAN_` environment variables, `__` separating nested keys
//!    (`LOGSCAN_PROFILES__AWS__KEY_SECRET`),
//! 4. command line [`Overrides`].
//!
//! ```toml
//! context = 10
//! paginate = false
//! decompress = "auto"
//! default_profile = "aws"
//!
//! [profiles.aws]
//! region = "eu-west-1"
//! key_id = "AKIA..."
//! key_secret = "..."
//!
//! # No keys: the AWS SDK credential chain, narrowed to a shared-config profile.
//! [profiles.ops]
//! region = "us-east-1"
//! aws_profile = "ops"
//! ```
//!
//! Without a selected profile S3 access uses the AWS SDK defaults.

pub mod error;
mod profile;

pub use crate::profile::{AccessKey, S3Settings, StoreOverrides, StoreProfile};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use logscan_compress::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "LOGSCAN_";
const DEFAULT_FILE_NAME: &str = "config.toml";
/// Name reported for S3 settings that come from no configured profile.
const AMBIENT_PROFILE: &str = "aws";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lines printed after each error line.
    pub context: usize,
    /// Follow S3 continuation tokens instead of stopping after one page.
    pub paginate: bool,
    /// `auto` picks the decoder from each key's suffix; anything else forces
    /// one format for every object.
    pub decompress: String,
    pub default_profile: Option<String>,
    pub profiles: BTreeMap<String, StoreProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context: 10,
            paginate: false,
            decompress: "auto".to_string(),
            default_profile: None,
            profiles: BTreeMap::new(),
        }
    }
}

/// Values set on the command line. Unset fields leave lower layers alone.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paginate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decompress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "default_profile")]
    pub profile: Option<String>,
}

impl Config {
    /// Default config file location, e.g. `~/.config/logscan/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "logscan").map(|dirs| dirs.config_dir().join(DEFAULT_FILE_NAME))
    }

    /// Load and validate the configuration.
    ///
    /// An explicit `path` must exist. Without one, the
    /// [default path](Self::default_path) is used if there is a file there.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::MissingFile(path.display().to_string())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        let figment = Self::figment(file.as_deref())?.merge(Serialized::defaults(overrides));
        Self::from_figment(&figment)
    }

    /// Defaults, then `file` (if any), then the environment.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Loading config file");
            let extension = file.extension().and_then(|e| e.to_str()).unwrap_or_default().to_lowercase();
            figment = match extension.as_str() {
                "toml" => figment.merge(Toml::file_exact(file)),
                "yaml" | "yml" => figment.merge(Yaml::file_exact(file)),
                "json" => figment.merge(Json::file_exact(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file.display().to_string())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate a configuration from any figment.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Parse)?;
        config.selector()?;
        if let Some(name) = &config.default_profile
            && !config.profiles.contains_key(name)
        {
            exn::bail!(ErrorKind::UnknownProfile(name.clone()));
        }
        Ok(config)
    }

    /// How to pick each object's decoder.
    pub fn selector(&self) -> Result<Selector> {
        self.decompress.parse::<Selector>().or_raise(|| ErrorKind::InvalidValue {
            field: "decompress",
            value: self.decompress.clone(),
        })
    }

    /// Name and contents of the store profile to use.
    ///
    /// `name` wins over `default_profile`. With neither, no profile is used
    /// and S3 access falls back to the AWS SDK defaults.
    pub fn profile(&self, name: Option<&str>) -> Result<Option<(&str, &StoreProfile)>> {
        let Some(name) = name.or(self.default_profile.as_deref()) else {
            return Ok(None);
        };
        match self.profiles.get_key_value(name) {
            Some((name, profile)) => Ok(Some((name.as_str(), profile))),
            None => exn::bail!(ErrorKind::UnknownProfile(name.to_string())),
        }
    }

    /// S3 settings for the selected profile, with `overrides` taking
    /// precedence over what the profile says.
    pub fn s3(&self, name: Option<&str>, overrides: &StoreOverrides) -> Result<S3Settings> {
        match self.profile(name)? {
            Some((name, profile)) => profile.resolve(name, overrides),
            None => {
                tracing::debug!("No store profile selected, using AWS SDK defaults");
                StoreProfile::default().resolve(AMBIENT_PROFILE, overrides)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use std::io::Write;

    const TOML: &str = r#"
        context = 3
        default_profile = "b2"

        [profiles.b2]
        region = "us-west-004"
        endpoint = "https://s3.us-west-004.backblazeb2.com"
        key_id = "id"
        key_secret = "secret"

        [profiles.aws]
        region = "eu-west-1"
        aws_profile = "ops"

        [profiles.halfkey]
        key_id = "id"
    "#;

    fn file_with(extension: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(extension).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_figment(&Figment::from(Serialized::defaults(Config::default()))).unwrap();
        assert_eq!(config.context, 10);
        assert!(!config.paginate);
        assert_eq!(config.selector().unwrap(), Selector::BySuffix);
    }

    #[test]
    fn test_load_toml() {
        let file = file_with(".toml", TOML);
        let config = Config::load(Some(file.path()), &Overrides::default()).unwrap();
        assert_eq!(config.context, 3);
        let settings = config.s3(None, &StoreOverrides::default()).unwrap();
        assert_eq!(settings.name, "b2");
        assert_eq!(settings.endpoint.as_deref(), Some("https://s3.us-west-004.backblazeb2.com"));
    }

    #[rstest]
    #[case(".yaml", "context: 0\npaginate: true\n")]
    #[case(".yml", "context: 0\npaginate: true\n")]
    #[case(".json", r#"{"context": 0, "paginate": true}"#)]
    fn test_load_other_formats(#[case] extension: &str, #[case] contents: &str) {
        let file = file_with(extension, contents);
        let config = Config::load(Some(file.path()), &Overrides::default()).unwrap();
        assert_eq!(config.context, 0);
        assert!(config.paginate);
    }

    #[test]
    fn test_unsupported_format() {
        let file = file_with(".ini", "context = 3");
        let err = Config::load(Some(file.path()), &Overrides::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), &Overrides::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingFile(_)));
    }

    #[test]
    fn test_overrides_win() {
        let file = file_with(".toml", TOML);
        let overrides = Overrides {
            context: Some(1),
            paginate: Some(true),
            decompress: Some("gzip".to_string()),
            profile: Some("aws".to_string()),
        };
        let config = Config::load(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.context, 1);
        assert!(config.paginate);
        assert_eq!(config.default_profile.as_deref(), Some("aws"));
        assert_eq!(config.selector().unwrap(), Selector::Always(logscan_compress::Compression::Gzip));
    }

    #[test]
    fn test_invalid_decompress() {
        let file = file_with(".toml", r#"decompress = "lz4""#);
        let err = Config::load(Some(file.path()), &Overrides::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidValue { field: "decompress", .. }));
    }

    #[test]
    fn test_unknown_default_profile() {
        let file = file_with(".toml", r#"default_profile = "gone""#);
        let err = Config::load(Some(file.path()), &Overrides::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::UnknownProfile("gone".to_string()));
    }

    #[test]
    fn test_negative_context_rejected() {
        let file = file_with(".toml", "context = -1");
        let err = Config::load(Some(file.path()), &Overrides::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::Parse);
    }

    #[test]
    fn test_profile_selection() {
        let file = file_with(".toml", TOML);
        let config = Config::load(Some(file.path()), &Overrides::default()).unwrap();
        assert_eq!(config.profile(None).unwrap().unwrap().0, "b2");
        assert_eq!(config.profile(Some("aws")).unwrap().unwrap().0, "aws");
        assert!(matches!(&*config.profile(Some("minio")).unwrap_err(), ErrorKind::UnknownProfile(_)));
        let err = config.s3(Some("halfkey"), &StoreOverrides::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingField { field: "key_secret", .. }));
    }

    #[test]
    fn test_profile_without_keys_uses_aws_defaults() {
        let file = file_with(".toml", TOML);
        let config = Config::load(Some(file.path()), &Overrides::default()).unwrap();
        let settings = config.s3(Some("aws"), &StoreOverrides::default()).unwrap();
        assert_eq!(settings.access_key, None);
        assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
        assert_eq!(settings.aws_profile.as_deref(), Some("ops"));
    }

    #[test]
    fn test_no_profile_uses_aws_defaults() {
        let config = Config::default();
        assert_eq!(config.profile(None).unwrap(), None);
        let overrides = StoreOverrides {
            region: Some("us-east-1".to_string()),
            ..StoreOverrides::default()
        };
        let settings = config.s3(None, &overrides).unwrap();
        assert_eq!(settings.name, AMBIENT_PROFILE);
        assert_eq!(settings.region.as_deref(), Some("us-east-1"));
        assert_eq!(settings.access_key, None);
        assert_eq!(settings.endpoint, None);
    }

    #[test]
    fn test_unselected_profiles_are_not_implicit() {
        let mut config = Config::default();
        config.profiles.insert("only".to_string(), StoreProfile {
            key_id: Some("id".to_string()),
            key_secret: Some("secret".to_string()),
            ..StoreProfile::default()
        });
        assert_eq!(config.profile(None).unwrap(), None);
        assert_eq!(config.s3(None, &StoreOverrides::default()).unwrap().access_key, None);
    }

    #[test]
    fn test_environment_layer() {
        // Only touches a profile no other test reads, since the environment
        // is shared with tests running in parallel.
        Jail::expect_with(|jail| {
            jail.create_file("logscan.toml", "[profiles.envonly]\nregion = \"eu-west-1\"\nkey_id = \"file-id\"\n")?;
            jail.set_env("LOGSCAN_PROFILES__ENVONLY__KEY_ID", "env-id");
            jail.set_env("LOGSCAN_PROFILES__ENVONLY__KEY_SECRET", "env-secret");
            let config = Config::load(Some(Path::new("logscan.toml")), &Overrides::default()).unwrap();
            let settings = config.s3(Some("envonly"), &StoreOverrides::default()).unwrap();
            let key = settings.access_key.unwrap();
            assert_eq!(key.id, "env-id");
            assert_eq!(key.secret, "env-secret");
            assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
            Ok(())
        });
    }
}
