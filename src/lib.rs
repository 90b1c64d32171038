//! STASE metrics for sparse labeled datasets
//!
//! This library scores how a set of labelers (for example antivirus engines)
//! label a set of entities (for example files): how evenly detections are
//! spread over labelers and labels, how much the labelers overlap, and how
//! consistent the labels assigned to one entity are.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: The sparse label matrix and its CSV loader
//! - **concentration**: The Ouroboros uniformity index
//! - **profile**: Per-labeler overlap, per-entity similarity, label clustering
//! - **metrics**: Aggregation into the STASE metric vector
//! - **pipeline**: The engine running everything on a worker pool
//! - **config**: Loader and engine configuration
//!
//! # Example
//!
//! ```no_run
//! use stase::prelude::*;
//!
//! let config = StaseConfig::default();
//! let labels = LabelMatrix::from_csv("detections.csv", &config).unwrap();
//! let report = StaseEngine::new(config).run(&labels).unwrap();
//! println!("{}", report.metrics);
//! ```

pub mod concentration;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod profile;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::concentration::{ouroboros, ouroboros_counts, Ouroboros};
    pub use crate::config::StaseConfig;
    pub use crate::data::LabelMatrix;
    pub use crate::error::{Result, StaseError};
    pub use crate::metrics::{compute_metrics, StaseMetrics, METRIC_NAMES};
    pub use crate::pipeline::{stase_metrics, stase_metrics_from_csv, StaseEngine, StaseReport};
    pub use crate::profile::{
        cluster_labels, column_stats, row_stats, ColumnProfile, ColumnStats, LabelClusters,
        LabelCount, OverlapCounts, RowProfile, RowStats, Summary,
    };
}
