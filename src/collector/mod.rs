/// Collector module
///
/// This module groups all logic responsible for:
/// - Fanning out one worker per region
/// - Driving paginated sources to exhaustion
/// - Funnelling every discovered item into one result collection
///
/// The collector layer acts as the orchestration layer between:
/// - Paginated sources (Secrets Manager, SSM, …)
/// - The output and loot stages
///
/// Design notes:
/// - API-specific logic MUST NOT live here
/// - Only the `intake::Collector` task mutates the result collection
/// - Progress is shared through an explicitly passed `ProgressTracker`
pub mod intake;
pub mod runner;
pub mod worker;

#[cfg(test)]
pub mod test_support;
