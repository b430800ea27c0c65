//! The worker capability set shared by all three protocols: `run`,
//! `record_start`, `record_end`, `add_wait_time`, `increment_retry`.

use std::time::{Duration, Instant};

use dlab_metrics::{MetricRecord, MetricStatus, MetricsReporter};

/// Bookkeeping every worker protocol carries, mirroring `core/worker.py`'s
/// `Worker` base class. Kept as plain data rather than a trait object since the three
/// protocols never need to be stored behind one handle — each scenario builds its own
/// homogeneous worker list.
pub struct WorkerRecord {
    pub name: String,
    started_at: Option<Instant>,
    retries: u32,
    wait_time: Duration,
}

impl WorkerRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: None,
            retries: 0,
            wait_time: Duration::ZERO,
        }
    }

    pub fn record_start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn increment_retry(&mut self) {
        self.retries += 1;
    }

    pub fn add_wait_time(&mut self, amount: Duration) {
        self.wait_time += amount;
    }

    /// Builds and sends the single terminal metric record for this worker.
    pub fn record_end(&self, status: MetricStatus, reporter: &MetricsReporter, scenario: &str) {
        let duration = self.started_at.map(|start| start.elapsed().as_secs_f64());
        let record = MetricRecord::new(
            self.name.clone(),
            status,
            self.retries,
            duration,
            self.wait_time.as_secs_f64(),
            scenario,
        );
        reporter.send(record);
    }
}

/// Times `f`, feeding the elapsed duration into `add_wait_time`, and returns `f`'s result.
pub fn timed<T>(record: &mut WorkerRecord, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    record.add_wait_time(start.elapsed());
    result
}
