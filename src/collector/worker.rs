use std::sync::Arc;

use log::{debug, error};

use super::intake::Intake;
use crate::{
    progress::ProgressTracker,
    schema::{ContinuationToken, Item},
    sources::adapter::PaginatedSource,
};

/// Per-region result of a worker run, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSummary {
    pub partition: String,
    pub submitted: usize,
    pub failed_sources: usize,
}

/// Enumerates every configured source for exactly one region.
///
/// DESIGN:
/// - Sources run one after another
/// - Pages of one source are fetched strictly in token order
/// - A failing source is logged, tallied and skipped
///
/// The worker never returns an error: remote failures end only the
/// source they came from.
pub struct PartitionWorker {
    partition: String,
    sources: Arc<[Arc<dyn PaginatedSource>]>,
    intake: Intake,
    progress: Arc<ProgressTracker>,
}

impl PartitionWorker {
    pub fn new(
        partition: String,
        sources: Arc<[Arc<dyn PaginatedSource>]>,
        intake: Intake,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            partition,
            sources,
            intake,
            progress,
        }
    }

    pub async fn run(self) -> PartitionSummary {
        let _running = Running::enter(&self.progress);

        let mut summary = PartitionSummary {
            partition: self.partition.clone(),
            submitted: 0,
            failed_sources: 0,
        };

        for source in self.sources.iter() {
            match self.drain_source(&**source).await {
                Ok(count) => summary.submitted += count,
                Err(count) => {
                    summary.submitted += count;
                    summary.failed_sources += 1;
                }
            }
        }

        debug!(
            "[{}] done: {} items, {} failed sources",
            summary.partition, summary.submitted, summary.failed_sources
        );
        summary
    }

    /// Runs one source to exhaustion.
    ///
    /// Returns the number of submitted items; `Err` still carries the
    /// count submitted before the failure.
    async fn drain_source(&self, source: &dyn PaginatedSource) -> Result<usize, usize> {
        let kind = source.kind();
        let mut token: Option<ContinuationToken> = None;
        let mut submitted = 0;

        loop {
            let page = match source.fetch_page(&self.partition, token.as_ref()).await {
                Ok(page) => page,
                Err(e) => {
                    error!("[{}] {kind}: {e}", self.partition);
                    self.progress.record_error();
                    return Err(submitted);
                }
            };

            debug!(
                "[{}] {kind}: page with {} records",
                self.partition,
                page.records.len()
            );

            for record in page.records {
                let item = Item::from_record(kind, &self.partition, record);
                if let Err(e) = self.intake.submit(item).await {
                    error!("[{}] {kind}: {e}", self.partition);
                    self.progress.record_error();
                    return Err(submitted);
                }
                submitted += 1;
            }

            match page.next_token {
                Some(next) => token = Some(next),
                None => return Ok(submitted),
            }
        }
    }
}

/// Holds a region in `executing`; dropping it (even while unwinding)
/// moves the region to `complete`.
struct Running<'a> {
    progress: &'a ProgressTracker,
}

impl<'a> Running<'a> {
    fn enter(progress: &'a ProgressTracker) -> Self {
        progress.start();
        Self { progress }
    }
}

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.progress.finish();
    }
}
