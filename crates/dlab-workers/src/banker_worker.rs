//! The Banker-negotiating protocol: partial requests against the shared
//! [`Banker`], retried with backoff on denial until the process's full claim is held.

use std::sync::Arc;
use std::time::Duration;

use dlab_core::Banker;
use dlab_metrics::{MetricStatus, MetricsReporter};
use rand::Rng;
use tracing::info;

use crate::common::{timed, WorkerRecord};
use crate::seed::rng_from;

pub struct BankerWorker {
    record: WorkerRecord,
    banker: Arc<Banker>,
    process_id: usize,
    claim: Vec<u32>,
    hold_time: Duration,
}

impl BankerWorker {
    pub fn new(
        name: impl Into<String>,
        banker: Arc<Banker>,
        process_id: usize,
        claim: Vec<u32>,
        hold_time: Duration,
    ) -> Self {
        Self {
            record: WorkerRecord::new(name),
            banker,
            process_id,
            claim,
            hold_time,
        }
    }

    /// Builds a partial request within `remaining`, forcing exactly one unit onto a
    /// random axis if every drawn component would otherwise be zero.
    /// Callers must never invoke this once `remaining` is already all zero.
    fn build_request(remaining: &[u32], rng: &mut impl Rng) -> Vec<u32> {
        debug_assert!(remaining.iter().any(|&need| need > 0));
        let mut request: Vec<u32> = remaining
            .iter()
            .map(|&need| if need == 0 { 0 } else { rng.gen_range(1..=need) })
            .collect();
        if request.iter().all(|&v| v == 0) {
            let axes: Vec<usize> = (0..remaining.len()).filter(|&i| remaining[i] > 0).collect();
            let idx = axes[rng.gen_range(0..axes.len())];
            request[idx] = 1;
        }
        request
    }

    pub fn run(mut self, reporter: &MetricsReporter, scenario: &str) {
        self.record.record_start();
        let name = self.record.name.clone();
        let mut rng = rng_from(name.clone());
        let mut remaining = self.claim.clone();
        let wait_between = (self.hold_time.as_secs_f64() / 2.0).max(0.2);

        loop {
            // Never construct a request once the full claim has already been met, or
            // `build_request` would have nothing left to draw from.
            if remaining.iter().all(|&need| need == 0) {
                info!(worker = %name, "reached maximum need, doing work");
                std::thread::sleep(self.hold_time);
                let released = self.banker.release_all(self.process_id).expect("valid pid");
                info!(worker = %name, "released resources {released:?}");
                self.record.record_end(MetricStatus::Ok, reporter, scenario);
                return;
            }

            let request = Self::build_request(&remaining, &mut rng);
            let granted = self
                .banker
                .request_resources(self.process_id, &request)
                .expect("valid pid and request shape");

            if granted {
                for (r, amount) in request.iter().enumerate() {
                    remaining[r] = remaining[r].saturating_sub(*amount);
                }
                let snapshot = self.banker.snapshot();
                info!(
                    worker = %name,
                    "request {request:?} granted; allocation={:?} available={:?}",
                    snapshot.allocation[self.process_id], snapshot.available
                );
                std::thread::sleep(self.hold_time / 3);
                continue;
            }

            self.record.increment_retry();
            info!(worker = %name, "request {request:?} denied (unsafe or exhausted), waiting {wait_between:.2}s");
            let jitter: f64 = rng.gen_range(0.0..=(self.hold_time.as_secs_f64() / 2.0).max(f64::EPSILON));
            let wait_for = Duration::from_secs_f64(wait_between + jitter);
            timed(&mut self.record, || std::thread::sleep(wait_for));
        }
    }
}
