//! `logscan`: print every error line, and the lines after it, from the logs
//! stored under an S3 prefix.
//!
//! Results go to stdout (`key:<object key>` before each error line); logs
//! and diagnostics go to stderr.

mod cli;
mod error;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use logscan_config::Config;
use logscan_scan::{ScanOptions, WalkSummary, walk};
use logscan_storage::StoreHandle;
use logscan_storage::backend::{LocalStore, S3Connection, S3Store};
use std::io::BufWriter;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder().with_default_directive(cli.log_level().into()).from_env_lossy())
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(summary) => {
            tracing::debug!(
                objects = summary.objects,
                bytes = summary.bytes,
                matches = summary.matches,
                emitted = summary.emitted,
                "Scan complete"
            );
            ExitCode::SUCCESS
        },
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<WalkSummary> {
    let config = Config::load(cli.config.as_deref(), &cli.overrides()).or_raise(|| ErrorKind::Config)?;
    let selector = config.selector().or_raise(|| ErrorKind::Config)?;

    let store: StoreHandle = match &cli.local {
        Some(root) => {
            let root = std::path::absolute(root).or_raise(|| ErrorKind::Store)?;
            Arc::new(LocalStore::new("local", root).or_raise(|| ErrorKind::Store)?)
        },
        None => {
            let settings = config.s3(cli.profile.as_deref(), &cli.store_overrides()).or_raise(|| ErrorKind::Config)?;
            tracing::debug!(
                profile = %settings.name,
                region = ?settings.region,
                endpoint = ?settings.endpoint,
                static_keys = settings.access_key.is_some(),
                "Using S3 store"
            );
            let connection = S3Connection {
                region: settings.region,
                endpoint: settings.endpoint,
                access_key: settings.access_key.map(|key| (key.id, key.secret)),
                profile: settings.aws_profile,
                profile_file: settings.aws_profile_file,
            };
            let store = S3Store::connect(settings.name, connection).await;
            Arc::new(store.with_pagination(config.paginate))
        },
    };

    let options = ScanOptions::new(cli.bucket, cli.path).with_context(config.context).with_selector(selector);
    let out = BufWriter::new(std::io::stdout());
    match walk(store.as_ref(), &options, out).await {
        Ok(summary) => Ok(summary),
        Err(err) => {
            let kind = ErrorKind::scan(&err);
            Err(err).or_raise(|| kind)
        },
    }
}
