use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Live counters for one enumeration run.
///
/// Purpose:
/// - Track region lifecycle (pending → executing → complete)
/// - Tally remote listing failures
/// - Tally local output / loot failures separately
///
/// Design:
/// - Lifecycle counters move together under one short lock, so
///   `pending + executing + complete == total` holds for every reader
/// - Error tallies are plain atomics
/// - Shared through `Arc`, one instance per run
/// - Decrements saturate at zero, counters never go negative
///
/// NOTE:
/// `errored` is a side tally, not a state. An errored region still
/// ends up in `complete`.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    lifecycle: Mutex<Lifecycle>,
    errored: AtomicUsize,
    artifact_errors: AtomicUsize,
}

#[derive(Debug, Default, Clone, Copy)]
struct Lifecycle {
    total: usize,
    pending: usize,
    executing: usize,
    complete: usize,
}

/// Point-in-time copy of the counters, safe to render or compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub pending: usize,
    pub executing: usize,
    pub complete: usize,
    pub errored: usize,
    pub artifact_errors: usize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more region as scheduled but not yet started.
    pub fn schedule(&self) {
        self.update(|l| {
            l.total += 1;
            l.pending += 1;
        });
    }

    /// pending → executing
    pub fn start(&self) {
        self.update(|l| {
            l.pending = l.pending.saturating_sub(1);
            l.executing += 1;
        });
    }

    /// executing → complete
    pub fn finish(&self) {
        self.update(|l| {
            l.executing = l.executing.saturating_sub(1);
            l.complete += 1;
        });
    }

    pub fn record_error(&self) {
        self.errored.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_artifact_error(&self) {
        self.artifact_errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let lifecycle = *self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        ProgressSnapshot {
            total: lifecycle.total,
            pending: lifecycle.pending,
            executing: lifecycle.executing,
            complete: lifecycle.complete,
            errored: self.errored.load(Ordering::SeqCst),
            artifact_errors: self.artifact_errors.load(Ordering::SeqCst),
        }
    }

    fn update(&self, f: impl FnOnce(&mut Lifecycle)) {
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut lifecycle);
    }
}

impl ProgressSnapshot {
    /// True once every scheduled region has reached `complete`.
    pub fn is_settled(&self) -> bool {
        self.pending == 0 && self.executing == 0 && self.complete == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn lifecycle_moves_region_through_states() {
        let progress = ProgressTracker::new();
        progress.schedule();
        progress.schedule();

        progress.start();
        let mid = progress.snapshot();
        assert_eq!((mid.pending, mid.executing, mid.complete), (1, 1, 0));

        progress.finish();
        progress.start();
        progress.finish();

        let done = progress.snapshot();
        assert_eq!(done.total, 2);
        assert!(done.is_settled());
    }

    #[test]
    fn decrements_never_underflow() {
        let progress = ProgressTracker::new();
        progress.start();
        progress.finish();

        let snap = progress.snapshot();
        assert_eq!(snap.pending, 0);
        assert_eq!(snap.executing, 0);
        assert_eq!(snap.complete, 1);
    }

    #[test]
    fn error_tallies_are_independent() {
        let progress = ProgressTracker::new();
        progress.record_error();
        progress.record_error();
        progress.record_artifact_error();

        let snap = progress.snapshot();
        assert_eq!(snap.errored, 2);
        assert_eq!(snap.artifact_errors, 1);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let progress = Arc::new(ProgressTracker::new());
        for _ in 0..64 {
            progress.schedule();
        }

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let progress = Arc::clone(&progress);
                std::thread::spawn(move || {
                    progress.start();
                    progress.record_error();
                    progress.finish();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snap = progress.snapshot();
        assert!(snap.is_settled());
        assert_eq!(snap.complete, 64);
        assert_eq!(snap.errored, 64);
    }
}
