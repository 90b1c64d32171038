//! End-to-end STASE computation.

mod engine;

pub use engine::{stase_metrics, stase_metrics_from_csv, StaseEngine, StaseReport};
