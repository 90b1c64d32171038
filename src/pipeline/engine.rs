//! Engine running the analyzers and the aggregator over one label matrix.

use crate::config::StaseConfig;
use crate::data::LabelMatrix;
use crate::error::{Result, StaseError};
use crate::metrics::{compute_metrics, StaseMetrics};
use crate::profile::{
    cluster_labels, column_stats, row_stats, ColumnProfile, LabelClusters, RowProfile,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Everything computed for one dataset: the metrics and the tables they derive from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaseReport {
    pub metrics: StaseMetrics,
    pub columns: ColumnProfile,
    pub rows: RowProfile,
    pub clusters: LabelClusters,
}

/// Runs the STASE computation on a dedicated worker pool.
#[derive(Debug, Clone, Default)]
pub struct StaseEngine {
    config: StaseConfig,
}

impl StaseEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: StaseConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    pub fn config(&self) -> &StaseConfig {
        &self.config
    }

    /// Compute the full report for a label matrix.
    ///
    /// Row and column statistics run concurrently on a pool of
    /// `config.threads` workers (0 = one per core). Labels are clustered and
    /// the metrics aggregated once both have completed. Any failure aborts
    /// the run; a failing row is reported before a failing column.
    pub fn run(&self, labels: &LabelMatrix) -> Result<StaseReport> {
        let n_rows = labels.n_rows();
        let n_columns = labels.n_columns();
        if n_rows == 0 || n_columns == 0 {
            return Err(StaseError::Shape {
                rows: n_rows,
                columns: n_columns,
            });
        }
        info!(apps = n_rows, avs = n_columns, "Starting STASE computation");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|i| format!("stase-worker-{}", i))
            .build()?;
        debug!(threads = pool.current_num_threads(), "Worker pool ready");

        let start = Instant::now();
        let (rows, columns) =
            pool.install(|| rayon::join(|| row_stats(labels), || column_stats(labels)));
        let rows = rows?;
        info!("rowstats computation DONE");
        let columns = columns?;
        info!("colstats computation DONE");
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Profiles computed");

        let clusters = cluster_labels(labels)?;
        info!(labels = clusters.n_labels(), "clustering DONE");

        let metrics = compute_metrics(n_rows, n_columns, &columns, &rows, &clusters)?;
        info!("metrics computation DONE");

        Ok(StaseReport {
            metrics,
            columns,
            rows,
            clusters,
        })
    }

    /// Load a delimited file with this engine's configuration and compute its report.
    pub fn run_csv<P: AsRef<Path>>(&self, path: P) -> Result<StaseReport> {
        let path = path.as_ref();
        info!(path = %path.display(), "Using as input file");
        let labels = LabelMatrix::from_csv(path, &self.config)?;
        self.run(&labels)
    }
}

/// Compute the STASE metrics of a label matrix with the default configuration.
pub fn stase_metrics(labels: &LabelMatrix) -> Result<StaseMetrics> {
    StaseEngine::default().run(labels).map(|report| report.metrics)
}

/// Load a delimited file and compute its full report.
pub fn stase_metrics_from_csv<P: AsRef<Path>>(
    path: P,
    config: &StaseConfig,
) -> Result<StaseReport> {
    StaseEngine::new(config.clone()).run_csv(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;

    fn scenario_matrix() -> LabelMatrix {
        let cells = vec![
            vec![Some("x"), Some("x")],
            vec![Some("y"), None],
            vec![None, Some("y")],
        ];
        LabelMatrix::from_dense(
            &cells,
            vec!["row1".into(), "row2".into(), "row3".into()],
            vec!["colA".into(), "colB".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_run_scenario() {
        let engine = StaseEngine::new(StaseConfig::default().with_threads(2));
        let report = engine.run(&scenario_matrix()).unwrap();

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.columns.len(), 2);
        assert_eq!(report.clusters.get("x"), Some(2));
        assert_eq!(report.clusters.get("y"), Some(2));
        assert!((report.metrics.synchronicity - 0.5).abs() < 1e-12);
        assert_eq!(report.metrics.resemblance, 1.0);
    }

    #[test]
    fn test_empty_matrix_rejected_before_analysis() {
        let cells: Vec<Vec<Option<&str>>> = Vec::new();
        let labels = LabelMatrix::from_dense(&cells, Vec::new(), vec!["av".into()]).unwrap();
        let result = StaseEngine::default().run(&labels);
        assert!(matches!(result, Err(StaseError::Shape { rows: 0, columns: 1 })));
    }

    #[test]
    fn test_row_failure_aborts() {
        let cells = vec![
            vec![Some("x"), Some("x")],
            vec![None, None],
            vec![Some("y"), Some("z")],
        ];
        let labels = LabelMatrix::from_dense(
            &cells,
            vec!["r1".into(), "r2".into(), "r3".into()],
            vec!["a".into(), "b".into()],
        )
        .unwrap();
        match StaseEngine::default().run(&labels) {
            Err(StaseError::RowTask { row, .. }) => assert_eq!(row, "r2"),
            other => panic!("expected row failure, got {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_code_reported_as_row_failure() {
        let mut tri_mat = TriMat::new((2, 2));
        tri_mat.add_triplet(0, 0, 0u32);
        tri_mat.add_triplet(0, 1, 1u32);
        tri_mat.add_triplet(1, 0, 1u32);
        tri_mat.add_triplet(1, 1, 7u32);
        let labels = LabelMatrix::new(
            tri_mat.to_csr(),
            vec!["trojan".into(), "worm".into()],
            vec!["r1".into(), "r2".into()],
            vec!["av1".into(), "av2".into()],
        )
        .unwrap();

        match StaseEngine::default().run(&labels) {
            Err(StaseError::RowTask { row, .. }) => assert_eq!(row, "r2"),
            other => panic!("expected row failure, got {:?}", other),
        }
    }

    #[test]
    fn test_repeatable() {
        let labels = scenario_matrix();
        let first = stase_metrics(&labels).unwrap();
        let second = stase_metrics(&labels).unwrap();
        assert_eq!(first, second);
    }
}
