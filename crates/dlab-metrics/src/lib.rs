//! Metric record collection, summarisation, and on-disk emission.

pub mod collector;
pub mod emit;
pub mod record;

pub use collector::{summarize, MetricsCollector, MetricsReporter, ScenarioSummary};
pub use emit::{write_metrics, EmitError, MetricsFormat};
pub use record::{MetricRecord, MetricStatus};
