//! Parameters shared by every scenario runner.

use std::time::Duration;

/// Knobs a scenario is run with. `dlab-cli` builds one of these per invocation from
/// `clap` arguments; the defaults here exist only for tests.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub workers: usize,
    pub resources: usize,
    /// Units per resource class. Only consulted by the Banker scenario; the three
    /// lock-based scenarios use binary `ResourceCell`s regardless of this value.
    pub resource_units: u32,
    pub hold_time: Duration,
    /// Watchdog join timeout, consulted only by the Deadlock scenario.
    pub timeout: Duration,
    /// Per-attempt acquisition timeout, consulted only by the Retry scenario.
    pub try_timeout: Duration,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            resources: 2,
            resource_units: 1,
            hold_time: Duration::from_millis(50),
            timeout: Duration::from_millis(200),
            try_timeout: Duration::from_millis(40),
        }
    }
}
