use clap::{ArgAction, Parser};
use logscan_config::{Overrides, StoreOverrides};
use std::path::PathBuf;
use tracing::Level;

/// Print the error lines (plus trailing context) of every log under an S3 prefix
#[derive(Parser, Debug)]
#[command(name = "logscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Bucket to scan
    #[arg(long, env = "LOGSCAN_BUCKET")]
    pub bucket: String,

    /// Key prefix to scan (a plain string prefix, not a directory)
    #[arg(long, default_value = "", env = "LOGSCAN_PATH")]
    pub path: String,

    /// Store profile from the config file
    #[arg(long)]
    pub profile: Option<String>,

    /// Region, overriding the profile's
    #[arg(long)]
    pub region: Option<String>,

    /// Endpoint URL for S3-compatible services, overriding the profile's
    #[arg(long)]
    pub endpoint: Option<String>,

    /// AWS shared config profile, when the store profile has no static keys
    #[arg(long, value_name = "NAME")]
    pub aws_profile: Option<String>,

    /// AWS credentials file to read instead of ~/.aws/credentials
    #[arg(long, value_name = "FILE")]
    pub aws_profile_file: Option<PathBuf>,

    /// Config file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Lines to print after each error line [default: 10]
    #[arg(short = 'C', long, value_name = "N")]
    pub context: Option<usize>,

    /// Decoder selection: auto (by key suffix), none, gzip or bzip2
    #[arg(long, value_name = "FORMAT")]
    pub decompress: Option<String>,

    /// List every page of the prefix instead of only the first 1000 keys
    #[arg(long)]
    pub paginate: bool,

    /// Scan a local directory (one subdirectory per bucket) instead of S3
    #[arg(long, value_name = "DIR")]
    pub local: Option<PathBuf>,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Default log level when `RUST_LOG` is not set.
    pub fn log_level(&self) -> Level {
        match (self.quiet, self.verbose) {
            (true, _) => Level::WARN,
            (false, 0) => Level::INFO,
            (false, 1) => Level::DEBUG,
            (false, _) => Level::TRACE,
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            context: self.context,
            paginate: self.paginate.then_some(true),
            decompress: self.decompress.clone(),
            profile: self.profile.clone(),
        }
    }

    pub fn store_overrides(&self) -> StoreOverrides {
        StoreOverrides {
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            aws_profile: self.aws_profile.clone(),
            aws_profile_file: self.aws_profile_file.clone(),
        }
    }
}
