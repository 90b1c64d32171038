//! Per-labeler, per-entity and per-label profiling of a label matrix.

mod clusters;
mod columns;
mod presence;
mod rows;
mod summary;

pub use clusters::{cluster_labels, LabelClusters, LabelCount};
pub use columns::{column_stats, ColumnProfile, ColumnStats};
pub use presence::{presence_vectors, OverlapCounts, PresenceVector};
pub use rows::{pairwise_similarities, row_stats, RowProfile, RowStats};
pub use summary::Summary;
