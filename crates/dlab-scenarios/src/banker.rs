//! The Banker's-algorithm avoidance scenario: workers share one `Banker`
//! instance behind an `Arc` and never enter an unsafe state in the first place.
//!
//! Ported from `core/scenario.py::BankerScenario`. Unlike the other three, this
//! scenario needs true shared memory for its workers, which `std::thread::spawn`
//! gives for free — no cooperative-cancellation workaround is needed here since
//! nothing in this scenario is ever force-terminated.

use std::sync::Arc;
use std::thread;

use dlab_core::Banker;
use dlab_metrics::MetricsCollector;
use dlab_workers::{rng_from, BankerWorker};
use rand::Rng;

use crate::config::ScenarioConfig;
use crate::labels::generate_labels;
use crate::outcome::ScenarioOutcome;

pub const TITLE: &str = "Scenario 4: Banker's algorithm";

/// Generates one safe-looking max-claim row per worker, each component drawn from
/// `[1, units]`. Seeded on `workers` alone, so the same `--workers` value always
/// reproduces the same claims.
fn build_claims(workers: usize, resources: usize, units: u32) -> Vec<Vec<u32>> {
    let mut rng = rng_from(workers);
    (0..workers)
        .map(|_| (0..resources).map(|_| rng.gen_range(1..=units.max(1))).collect())
        .collect()
}

pub fn run(config: &ScenarioConfig) -> ScenarioOutcome {
    let labels = generate_labels(config.resources);
    let pool: Vec<u32> = vec![config.resource_units; config.resources];
    println!(
        "[parent] total resources: {}",
        labels
            .iter()
            .zip(&pool)
            .map(|(l, q)| format!("{l}={q}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let claims = build_claims(config.workers, config.resources, config.resource_units);
    println!("[parent] declared maximum needs per process:");
    for (idx, claim) in claims.iter().enumerate() {
        let needs = claim
            .iter()
            .zip(&labels)
            .map(|(amount, label)| format!("{amount}x {label}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!(" - P{}: {needs}", idx + 1);
    }

    // `build_claims` never draws above `units`, which is exactly `pool`'s per-class
    // capacity, so this can never hit the zero-capacity-claim rejection below.
    let banker = Arc::new(Banker::new(pool, claims.clone()).expect("generated claims stay within capacity"));
    let (reporter, collector) = MetricsCollector::new();

    let handles: Vec<_> = claims
        .into_iter()
        .enumerate()
        .map(|(idx, claim)| {
            let worker = BankerWorker::new(
                format!("P{}", idx + 1),
                Arc::clone(&banker),
                idx,
                claim,
                config.hold_time,
            );
            let reporter = reporter.clone();
            thread::spawn(move || worker.run(&reporter, TITLE))
        })
        .collect();

    crate::join::join_all(handles);

    println!("[parent] the banker only ever admitted safe states; no deadlock occurred.");
    let outcome = ScenarioOutcome::new(TITLE, collector.drain(), config.workers);
    outcome.log_summary();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // every worker finishes ok under the banker's admission control.
    #[test]
    fn three_workers_all_finish_ok() {
        let config = ScenarioConfig {
            workers: 3,
            resources: 2,
            resource_units: 2,
            hold_time: Duration::from_millis(4),
            timeout: Duration::from_secs(5),
            try_timeout: Duration::from_millis(10),
        };
        let outcome = run(&config);
        assert_eq!(outcome.summary.records_received, 3);
        assert_eq!(outcome.summary.ok_count, 3);
    }

    #[test]
    fn claims_are_reproducible_for_the_same_worker_count() {
        let a = build_claims(4, 3, 2);
        let b = build_claims(4, 3, 2);
        assert_eq!(a, b);
        for row in &a {
            assert!(row.iter().all(|&v| (1..=2).contains(&v)));
        }
    }
}
