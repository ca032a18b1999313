//! Walking every object under a prefix.

use crate::ScanOptions;
use crate::error::{ErrorKind, Result};
use crate::object::{ObjectReport, scan_object};
use exn::ResultExt;
use logscan_storage::ObjectStore;
use std::io::Write;
use tracing::instrument;

/// Totals for a finished walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub objects: u64,
    pub bytes: u64,
    pub matches: u64,
    pub emitted: u64,
}

impl WalkSummary {
    fn add(&mut self, report: &ObjectReport) {
        self.objects += 1;
        self.bytes += report.bytes;
        self.matches += report.matches;
        self.emitted += report.emitted;
    }
}

/// Scan every object under `options.prefix`, one after another in listing
/// order, writing results to `out`.
///
/// The listing is logged (`total N files`) before the first object is
/// fetched. Each object is fetched, then scanned on a blocking thread; the
/// next object is only fetched once the previous one is done, so output is
/// never interleaved. Any failure ends the walk immediately.
///
/// # Examples
///
/// ```no_run
/// use logscan_scan::{ScanOptions, walk};
/// use logscan_storage::backend::LocalStore;
///
/// # async fn example() -> logscan_scan::error::Result<()> {
/// let store = LocalStore::new("mirror", "/srv/mirror").unwrap();
/// let summary = walk(&store, &ScanOptions::new("archive", "jobs/"), std::io::stdout()).await?;
/// eprintln!("{} error lines in {} objects", summary.matches, summary.objects);
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all, fields(store = store.name(), bucket = %options.bucket, prefix = %options.prefix))]
pub async fn walk<W: Write + Send + 'static>(
    store: &dyn ObjectStore,
    options: &ScanOptions,
    mut out: W,
) -> Result<WalkSummary> {
    let objects = store.list(&options.bucket, &options.prefix).await.or_raise(|| ErrorKind::Enumeration {
        bucket: options.bucket.clone(),
        prefix: options.prefix.clone(),
    })?;
    tracing::info!(count = objects.len(), "total {} files", objects.len());

    let mut summary = WalkSummary::default();
    for object in objects {
        let key = object.key;
        let body = store.get(&options.bucket, &key).await.or_raise(|| ErrorKind::Retrieval(key.clone()))?;
        let (selector, context) = (options.selector, options.context);
        let task_key = key.clone();
        let (returned, result) = tokio::task::spawn_blocking(move || {
            let result = scan_object(&task_key, body, selector, context, &mut out);
            // Flush per object so matches show up while the walk is still running.
            let result = result.and_then(|report| out.flush().map(|()| report).or_raise(|| ErrorKind::Output));
            (out, result)
        })
        .await
        .or_raise(|| ErrorKind::Task(key.clone()))?;
        out = returned;
        let report = result?;
        summary.add(&report);
    }
    tracing::debug!(?summary, "Walk finished");
    Ok(summary)
}
