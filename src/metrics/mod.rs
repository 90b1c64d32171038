//! STASE metric aggregation.

mod stase;

pub use stase::{compute_metrics, StaseMetrics, METRIC_NAMES};
