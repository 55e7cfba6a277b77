//! Refresh pipeline: route each configured series and upsert it into the store.
//!
//! A failing series never stops the batch. Failures are collected in the
//! [`RefreshSummary`] and reported through [`RefreshProgress`].

use crate::config::RefreshJob;
use argmacro_core::data::{FetchError, ProviderRouter};
use argmacro_core::store::{SeriesWriter, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

/// What one successful job wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub provider: String,
    pub points: usize,
}

/// Progress callback for multi-series refreshes.
pub trait RefreshProgress: Send {
    fn on_start(&self, series: &str, index: usize, total: usize);

    fn on_complete(
        &self,
        series: &str,
        index: usize,
        total: usize,
        result: &Result<RefreshOutcome, RefreshError>,
    );

    fn on_batch_complete(&self, summary: &RefreshSummary);
}

/// Prints one line per series, then a summary.
pub struct StdoutProgress;

impl RefreshProgress for StdoutProgress {
    fn on_start(&self, series: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {series}...", index + 1, total);
    }

    fn on_complete(
        &self,
        series: &str,
        _index: usize,
        _total: usize,
        result: &Result<RefreshOutcome, RefreshError>,
    ) {
        match result {
            Ok(o) => println!("  OK: {series} ({} points from {})", o.points, o.provider),
            Err(e) => println!("  FAIL: {series}: {e}"),
        }
    }

    fn on_batch_complete(&self, summary: &RefreshSummary) {
        println!(
            "\nRefresh complete: {}/{} succeeded, {} failed",
            summary.succeeded,
            summary.total,
            summary.failed()
        );
    }
}

/// Silent progress for tests and the watcher.
pub struct NoProgress;

impl RefreshProgress for NoProgress {
    fn on_start(&self, _: &str, _: usize, _: usize) {}
    fn on_complete(&self, _: &str, _: usize, _: usize, _: &Result<RefreshOutcome, RefreshError>) {}
    fn on_batch_complete(&self, _: &RefreshSummary) {}
}

#[derive(Debug, Default)]
pub struct RefreshSummary {
    pub total: usize,
    pub succeeded: usize,
    pub points_written: usize,
    /// `(series, error message)` for every failed job, in job order.
    pub errors: Vec<(String, String)>,
}

impl RefreshSummary {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.errors.is_empty()
    }
}

fn run_job(
    router: &ProviderRouter,
    writer: &dyn SeriesWriter,
    job: &RefreshJob,
) -> Result<RefreshOutcome, RefreshError> {
    let routed = router.fetch_routed(&job.series, job.start, job.end)?;
    let points = writer.upsert_points(&job.series, &routed.points)?;
    Ok(RefreshOutcome {
        provider: routed.provider,
        points,
    })
}

/// Hint printed for a series that no prioritized provider serves.
pub fn unservable_hint(series: &str) -> String {
    format!(
        "no provider in the priority list serves {series}; add LOCALCSV to providers.priority \
         and point providers.local_series_dir (or LOCAL_SERIES_DIR) at a directory with {series}.csv"
    )
}

/// Split `jobs` into those some prioritized provider supports and those none
/// does, keeping job order in both.
pub fn partition_servable(
    router: &ProviderRouter,
    jobs: &[RefreshJob],
) -> (Vec<RefreshJob>, Vec<RefreshJob>) {
    jobs.iter().cloned().partition(|job| router.serves(&job.series))
}

/// Fetch every job through `router` and write the points into `writer`.
pub fn refresh_series(
    router: &ProviderRouter,
    writer: &dyn SeriesWriter,
    jobs: &[RefreshJob],
    progress: &dyn RefreshProgress,
) -> RefreshSummary {
    let total = jobs.len();
    let mut summary = RefreshSummary {
        total,
        ..Default::default()
    };

    for (i, job) in jobs.iter().enumerate() {
        progress.on_start(&job.series, i, total);
        let result = run_job(router, writer, job);
        match &result {
            Ok(o) => {
                tracing::info!(series = %job.series, provider = %o.provider, points = o.points, "series refreshed");
                summary.succeeded += 1;
                summary.points_written += o.points;
            }
            Err(e) => {
                tracing::warn!(series = %job.series, error = %e, "series refresh failed");
                summary.errors.push((job.series.clone(), e.to_string()));
            }
        }
        progress.on_complete(&job.series, i, total, &result);
    }

    progress.on_batch_complete(&summary);
    summary
}
