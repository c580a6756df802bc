use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{error, info};
use tokio::task::JoinSet;

use super::{intake::Collector, worker::PartitionWorker};
use crate::{
    progress::{ProgressSnapshot, ProgressTracker},
    schema::ResultCollection,
    sources::adapter::PaginatedSource,
    status::StatusReporter,
};

/// Knobs for one enumeration run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Module label used in status output
    pub module: &'static str,

    /// Bounded collector intake size
    pub intake_capacity: usize,

    /// Status line cadence
    pub status_interval: Duration,
}

/// What a finished run hands to the output stage.
#[derive(Debug)]
pub struct RunOutcome {
    pub items: ResultCollection,
    pub progress: ProgressSnapshot,
}

/// Enumerates every source in every region and merges the results.
///
/// Lifecycle:
/// 1. Schedule every region as pending
/// 2. Start the collector and the status reporter
/// 3. Spawn one worker per region
/// 4. Wait for all workers
/// 5. Stop the status reporter, then the collector
///
/// GUARANTEES:
/// - A failing region never fails the run
/// - The collector is stopped only after every worker has returned,
///   so no submitted item is lost
/// - Zero regions is a valid run with an empty result
///
/// Errors are returned only when one of the two long-lived tasks is
/// gone before it could acknowledge its stop.
pub async fn run_enumeration(
    regions: &[String],
    sources: Vec<Arc<dyn PaginatedSource>>,
    settings: &RunSettings,
    progress: Arc<ProgressTracker>,
) -> Result<RunOutcome> {
    for _ in regions {
        progress.schedule();
    }

    let collector = Collector::spawn(settings.intake_capacity);
    let status = StatusReporter::spawn(
        settings.module,
        Arc::clone(&progress),
        settings.status_interval,
    );

    let outcome = enumerate_with(regions, sources, collector, status, progress).await?;
    eprintln!();
    Ok(outcome)
}

/// Run body with the long-lived tasks supplied by the caller.
async fn enumerate_with(
    regions: &[String],
    sources: Vec<Arc<dyn PaginatedSource>>,
    collector: Collector,
    status: StatusReporter,
    progress: Arc<ProgressTracker>,
) -> Result<RunOutcome> {
    let sources: Arc<[Arc<dyn PaginatedSource>]> = sources.into();

    let mut workers = JoinSet::new();
    for region in regions {
        let worker = PartitionWorker::new(
            region.clone(),
            Arc::clone(&sources),
            collector.intake(),
            Arc::clone(&progress),
        );
        workers.spawn(worker.run());
    }

    // Only synchronization point before the collector may be stopped.
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(summary) => info!(
                "[{}] finished with {} items",
                summary.partition, summary.submitted
            ),
            Err(e) => {
                error!("region worker aborted: {e}");
                progress.record_error();
            }
        }
    }

    let final_status = status.stop().await?;
    let items = collector.stop().await?;

    Ok(RunOutcome {
        items,
        progress: final_status,
    })
}
