//! Scenario runners: each wires resources, workers, and metrics together,
//! mirroring `core/scenario.py`'s four scenario classes.

pub mod banker;
pub mod config;
pub mod deadlock;
pub mod join;
pub mod labels;
pub mod ordered;
pub mod outcome;
pub mod retry;
pub mod watchdog;

pub use config::ScenarioConfig;
pub use outcome::ScenarioOutcome;

/// Runs all four scenarios back to back, in the fixed pedagogical order: Deadlock,
/// Ordered, Retry, Banker.
pub fn run_all(config: &ScenarioConfig) -> Vec<ScenarioOutcome> {
    vec![
        deadlock::run(config),
        ordered::run(config),
        retry::run(config),
        banker::run(config),
    ]
}
