//! The naive acquisition protocol — acquires resources in a fixed order
//! with no timeout, so an opposing acquisition order between two workers can deadlock.

use std::sync::Arc;
use std::time::Duration;

use dlab_core::ResourceCell;
use dlab_metrics::{MetricStatus, MetricsReporter};
use tracing::info;

use crate::common::{timed, WorkerRecord};

pub struct NaiveWorker {
    record: WorkerRecord,
    resources: Vec<(Arc<ResourceCell>, String)>,
    hold_time: Duration,
}

impl NaiveWorker {
    pub fn new(
        name: impl Into<String>,
        resources: Vec<(Arc<ResourceCell>, String)>,
        hold_time: Duration,
    ) -> Self {
        Self {
            record: WorkerRecord::new(name),
            resources,
            hold_time,
        }
    }

    /// Runs to completion, acquiring every resource in order and releasing in reverse.
    /// Held cells are always released on the way out, success or panic, via the
    /// `ReleaseGuard` below — the idiomatic stand-in for the source's `try/finally`.
    pub fn run(mut self, reporter: &MetricsReporter, scenario: &str) {
        self.record.record_start();
        let name = self.record.name.clone();
        let mut guard = ReleaseGuard::default();

        for (cell, label) in &self.resources {
            info!(worker = %name, "needs {label}");
            timed(&mut self.record, || cell.acquire());
            guard.acquired.push(Arc::clone(cell));
            info!(worker = %name, "acquired {label}, working");
            std::thread::sleep(self.hold_time);
        }

        info!(worker = %name, "finished joint work, releasing resources");
        guard.release_all();
        self.record.record_end(MetricStatus::Ok, reporter, scenario);
    }
}

/// Releases every acquired cell in reverse order on drop, whether `run` returned
/// normally or unwound through a panic — everything still held gets released either way.
#[derive(Default)]
struct ReleaseGuard {
    acquired: Vec<Arc<ResourceCell>>,
}

impl ReleaseGuard {
    fn release_all(&mut self) {
        for cell in self.acquired.drain(..).rev() {
            cell.release_best_effort();
        }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // a single resource, multiple workers — no circular wait is possible.
    #[test]
    fn single_resource_two_workers_both_finish() {
        let (reporter, collector) = dlab_metrics::MetricsCollector::new();
        let cell = Arc::new(ResourceCell::new("R1"));

        let w1 = NaiveWorker::new("P1", vec![(Arc::clone(&cell), "R1".into())], Duration::from_millis(5));
        let w2 = NaiveWorker::new("P2", vec![(Arc::clone(&cell), "R1".into())], Duration::from_millis(5));

        let r1 = reporter.clone();
        let r2 = reporter.clone();
        let h1 = std::thread::spawn(move || w1.run(&r1, "Test"));
        let h2 = std::thread::spawn(move || w2.run(&r2, "Test"));
        h1.join().unwrap();
        h2.join().unwrap();

        let records = collector.drain();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status == MetricStatus::Ok));
    }

    #[test]
    fn resources_release_in_reverse_acquisition_order() {
        let (reporter, collector) = dlab_metrics::MetricsCollector::new();
        let a = Arc::new(ResourceCell::new("A"));
        let b = Arc::new(ResourceCell::new("B"));

        let worker = NaiveWorker::new(
            "P1",
            vec![(Arc::clone(&a), "A".into()), (Arc::clone(&b), "B".into())],
            Duration::from_millis(1),
        );
        worker.run(&reporter, "Test");

        // Both must be free again for another acquirer.
        assert!(a.try_acquire(Duration::from_millis(10)));
        assert!(b.try_acquire(Duration::from_millis(10)));
        a.release().unwrap();
        b.release().unwrap();
        assert_eq!(collector.drain().len(), 1);
    }
}
