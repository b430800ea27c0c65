//! The timeout-plus-randomised-backoff protocol: bounded acquisition
//! attempts with rollback and a de-correlating random sleep between rounds.

use std::sync::Arc;
use std::time::Duration;

use dlab_core::ResourceCell;
use dlab_metrics::{MetricStatus, MetricsReporter};
use rand::Rng;
use tracing::info;

use crate::common::{timed, WorkerRecord};
use crate::seed::rng_from;

pub struct RetryWorker {
    record: WorkerRecord,
    resources: Vec<(Arc<ResourceCell>, String)>,
    hold_time: Duration,
    try_timeout: Duration,
}

impl RetryWorker {
    pub fn new(
        name: impl Into<String>,
        resources: Vec<(Arc<ResourceCell>, String)>,
        hold_time: Duration,
        try_timeout: Duration,
    ) -> Self {
        let name = name.into();
        Self {
            record: WorkerRecord::new(name),
            resources,
            hold_time,
            try_timeout,
        }
    }

    pub fn run(mut self, reporter: &MetricsReporter, scenario: &str) {
        self.record.record_start();
        let name = self.record.name.clone();
        let mut rng = rng_from(name.clone());

        loop {
            let mut acquired: Vec<Arc<ResourceCell>> = Vec::new();
            let mut failed = false;

            for (cell, label) in &self.resources {
                info!(worker = %name, "needs {label}");
                let got = timed(&mut self.record, || cell.try_acquire(self.try_timeout));
                if !got {
                    self.record.increment_retry();
                    info!(worker = %name, "timed out waiting for {label}, releasing held resources");
                    failed = true;
                    break;
                }
                acquired.push(Arc::clone(cell));
                info!(worker = %name, "acquired {label}, working");
                std::thread::sleep(self.hold_time);
            }

            if !failed && acquired.len() == self.resources.len() {
                info!(worker = %name, "acquired every resource, finishing work and releasing");
                std::thread::sleep(self.hold_time);
                for cell in acquired.into_iter().rev() {
                    cell.release_best_effort();
                }
                info!(worker = %name, "released resources and finished without deadlock");
                self.record.record_end(MetricStatus::Ok, reporter, scenario);
                return;
            }

            for cell in acquired.into_iter().rev() {
                cell.release_best_effort();
            }

            // Fixed backoff risks lockstep livelock between workers retrying in the
            // same opposing order, so the sleep is jittered rather than constant.
            let half_hold = self.hold_time.as_secs_f64() / 2.0;
            let jitter: f64 = rng.gen_range(0.0..=half_hold.max(f64::EPSILON));
            let sleep_for = Duration::from_secs_f64(half_hold + jitter);
            timed(&mut self.record, || std::thread::sleep(sleep_for));
        }
    }
}
