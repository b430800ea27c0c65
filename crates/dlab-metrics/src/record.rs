//! The per-worker metric record and its on-disk shape.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Ok,
    Error,
}

impl MetricStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricStatus::Ok => "ok",
            MetricStatus::Error => "error",
        }
    }
}

/// One record per worker, emitted exactly once at termination.
#[derive(Debug, Clone, Serialize)]
pub struct MetricRecord {
    pub name: String,
    pub status: MetricStatus,
    pub retries: u32,
    /// `None` when `record_end` is called without a prior `record_start` having run.
    pub duration: Option<f64>,
    pub wait_time: f64,
    /// The scenario's full title, e.g. "Scenario 1: Deadlock".
    pub scenario: String,
    /// The substring of `scenario` before the first colon, e.g. "Scenario 1".
    ///
    /// Serialised as `cenario` on disk — a long-standing typo in the field name,
    /// kept verbatim rather than renamed out from under existing downstream consumers.
    #[serde(rename = "cenario")]
    pub scenario_tag: String,
}

impl MetricRecord {
    /// Builds a record with `duration`/`wait_time` rounded to three decimal places,
    /// and `scenario_tag` derived from `scenario`.
    pub fn new(
        name: impl Into<String>,
        status: MetricStatus,
        retries: u32,
        duration: Option<f64>,
        wait_time: f64,
        scenario: impl Into<String>,
    ) -> Self {
        let scenario = scenario.into();
        let scenario_tag = scenario
            .split_once(':')
            .map(|(tag, _)| tag.trim().to_string())
            .unwrap_or_else(|| scenario.clone());
        Self {
            name: name.into(),
            status,
            retries,
            duration: duration.map(round3),
            wait_time: round3(wait_time),
            scenario,
            scenario_tag,
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
