//! The STASE metric vector and its aggregation from the per-axis profiles.

use crate::concentration::ouroboros_counts;
use crate::error::{Result, StaseError};
use crate::profile::{ColumnProfile, LabelClusters, RowProfile};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Names of every metric, in output order.
pub const METRIC_NAMES: [&str; 14] = [
    "equiponderance",
    "equiponderance_idx",
    "exclusivity",
    "recognition",
    "synchronicity",
    "genericity",
    "uniformity",
    "uniformity_idx",
    "divergence",
    "consensuality",
    "resemblance",
    "avs",
    "apps",
    "labels",
];

/// STASE metrics of one labeled dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaseMetrics {
    /// Ouroboros index of labeler positives (1 = every labeler labels as much).
    pub equiponderance: f64,
    /// Ouroboros indice of labeler positives.
    pub equiponderance_idx: usize,
    /// Share of entities labeled by exactly one labeler.
    pub exclusivity: f64,
    /// Mean share of labelers labeling an entity.
    pub recognition: f64,
    /// Mean pairwise overlap between labelers.
    pub synchronicity: f64,
    /// How much labels are reused across detections (1 = a single label).
    pub genericity: f64,
    /// Ouroboros index of label occurrence counts.
    pub uniformity: f64,
    /// Ouroboros indice of label occurrence counts.
    pub uniformity_idx: usize,
    /// Share of extra labels per entity that differ from each other.
    pub divergence: f64,
    /// Share of extra labels per entity that agree with the majority label.
    pub consensuality: f64,
    /// Mean pairwise label similarity within entities.
    pub resemblance: f64,
    /// Number of labelers (N).
    pub avs: usize,
    /// Number of entities (M).
    pub apps: usize,
    /// Number of distinct labels (O).
    pub labels: usize,
}

impl StaseMetrics {
    /// Every metric as a (name, value) pair, in output order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("equiponderance", self.equiponderance),
            ("equiponderance_idx", self.equiponderance_idx as f64),
            ("exclusivity", self.exclusivity),
            ("recognition", self.recognition),
            ("synchronicity", self.synchronicity),
            ("genericity", self.genericity),
            ("uniformity", self.uniformity),
            ("uniformity_idx", self.uniformity_idx as f64),
            ("divergence", self.divergence),
            ("consensuality", self.consensuality),
            ("resemblance", self.resemblance),
            ("avs", self.avs as f64),
            ("apps", self.apps as f64),
            ("labels", self.labels as f64),
        ]
    }

    /// Look up a metric by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(metric, _)| *metric == name)
            .map(|(_, value)| value)
    }

    /// Serialize to a JSON object keyed by metric name.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(StaseError::from)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(StaseError::from)
    }

    /// Write a two-column `metric value` TSV table.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "metric\tvalue")?;
        for (name, value) in self.entries() {
            writeln!(writer, "{}\t{}", name, value)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Display for StaseMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, value) in self.entries() {
            writeln!(f, "{:<20}{:>12.6}", name, value)?;
        }
        Ok(())
    }
}

fn ratio(metric: &'static str, numerator: f64, denominator: f64) -> Result<f64> {
    if denominator == 0.0 {
        return Err(StaseError::ComputationDivision { metric });
    }
    Ok(numerator / denominator)
}

fn mean(metric: &'static str, values: &[f64]) -> Result<f64> {
    ratio(metric, values.iter().sum(), values.len() as f64)
}

/// Combine the per-labeler, per-entity and per-label results into the metric vector.
///
/// # Errors
/// - `Shape` if the table has no entity or no labeler
/// - `ComputationDivision` naming the metric whose denominator is zero
/// - `DegenerateInput` if an Ouroboros input sums to zero
pub fn compute_metrics(
    n_rows: usize,
    n_columns: usize,
    columns: &ColumnProfile,
    rows: &RowProfile,
    clusters: &LabelClusters,
) -> Result<StaseMetrics> {
    if n_rows == 0 || n_columns == 0 {
        return Err(StaseError::Shape {
            rows: n_rows,
            columns: n_columns,
        });
    }

    let m = n_rows as f64;
    let n = n_columns as f64;
    let o = clusters.n_labels();

    let row_positives = rows.total_positives() as f64;
    let column_positives = columns.total_positives() as f64;

    // Output order: the first failing metric is the one reported
    let equiponderance = ouroboros_counts(&columns.positives())?;
    let exclusivity = ratio("exclusivity", columns.total_alones() as f64, m)?;
    let recognition = ratio("recognition", row_positives, rows.len() as f64)? / n;
    let synchronicity = mean("synchronicity", &columns.overlap_means())?;
    let genericity = 1.0 - ratio("genericity", o as f64 - 1.0, column_positives - 1.0)?;
    let uniformity = ouroboros_counts(&clusters.counts())?;
    let divergence = ratio(
        "divergence",
        rows.total_distincts() as f64 - m,
        row_positives - m,
    )?;
    let consensuality = ratio(
        "consensuality",
        rows.total_max() as f64 - m,
        row_positives - m,
    )?;
    let resemblance = mean("resemblance", &rows.similarity_means())?;

    Ok(StaseMetrics {
        equiponderance: equiponderance.index,
        equiponderance_idx: equiponderance.indice,
        exclusivity,
        recognition,
        synchronicity,
        genericity,
        uniformity: uniformity.index,
        uniformity_idx: uniformity.indice,
        divergence,
        consensuality,
        resemblance,
        avs: n_columns,
        apps: n_rows,
        labels: o,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ColumnStats, LabelCount, RowStats, Summary};

    fn column(id: &str, positives: usize, alones: usize, overlap: Option<f64>) -> ColumnStats {
        ColumnStats {
            column_id: id.to_string(),
            positives,
            alones,
            distincts: positives,
            overlap: overlap.map(|v| Summary {
                mean: v,
                min: v,
                max: v,
            }),
        }
    }

    fn row(id: &str, positives: usize, distincts: usize, max: usize, sim: Option<f64>) -> RowStats {
        RowStats {
            row_id: id.to_string(),
            positives,
            distincts,
            max,
            similarity: sim.map(|v| Summary {
                mean: v,
                min: v,
                max: v,
            }),
        }
    }

    fn clusters(counts: &[(&str, usize)]) -> LabelClusters {
        LabelClusters {
            clusters: counts
                .iter()
                .map(|&(label, count)| LabelCount {
                    label: label.to_string(),
                    count,
                })
                .collect(),
        }
    }

    fn scenario() -> (ColumnProfile, RowProfile, LabelClusters) {
        let columns = ColumnProfile {
            columns: vec![column("colA", 2, 1, Some(0.5)), column("colB", 2, 1, Some(0.5))],
        };
        let rows = RowProfile {
            rows: vec![
                row("row1", 2, 1, 2, Some(1.0)),
                row("row2", 1, 1, 1, None),
                row("row3", 1, 1, 1, None),
            ],
        };
        (columns, rows, clusters(&[("x", 2), ("y", 2)]))
    }

    #[test]
    fn test_scenario_metrics() {
        let (columns, rows, clusters) = scenario();
        let metrics = compute_metrics(3, 2, &columns, &rows, &clusters).unwrap();

        assert!((metrics.equiponderance - 1.0).abs() < 1e-12);
        assert_eq!(metrics.equiponderance_idx, 1);
        assert!((metrics.exclusivity - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.recognition - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.synchronicity - 0.5).abs() < 1e-12);
        assert!((metrics.genericity - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics.uniformity - 1.0).abs() < 1e-12);
        assert_eq!(metrics.uniformity_idx, 1);
        assert_eq!(metrics.divergence, 0.0);
        assert_eq!(metrics.consensuality, 1.0);
        assert_eq!(metrics.resemblance, 1.0);
        assert_eq!((metrics.avs, metrics.apps, metrics.labels), (2, 3, 2));
    }

    #[test]
    fn test_entries_follow_names() {
        let (columns, rows, clusters) = scenario();
        let metrics = compute_metrics(3, 2, &columns, &rows, &clusters).unwrap();
        let names: Vec<&str> = metrics.entries().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, METRIC_NAMES.to_vec());
        assert_eq!(metrics.get("apps"), Some(3.0));
        assert_eq!(metrics.get("unknown"), None);
    }

    #[test]
    fn test_json_keys() {
        let (columns, rows, clusters) = scenario();
        let metrics = compute_metrics(3, 2, &columns, &rows, &clusters).unwrap();
        let value: serde_json::Value = serde_json::from_str(&metrics.to_json().unwrap()).unwrap();
        for name in METRIC_NAMES {
            assert!(value.get(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn test_empty_shape() {
        let (columns, rows, clusters) = scenario();
        let result = compute_metrics(0, 2, &columns, &rows, &clusters);
        assert!(matches!(result, Err(StaseError::Shape { rows: 0, columns: 2 })));
    }

    #[test]
    fn test_one_label_per_row_fails_divergence() {
        let columns = ColumnProfile {
            columns: vec![column("a", 1, 1, Some(0.0)), column("b", 1, 1, Some(0.0))],
        };
        let rows = RowProfile {
            rows: vec![row("r1", 1, 1, 1, None), row("r2", 1, 1, 1, None)],
        };
        let result = compute_metrics(2, 2, &columns, &rows, &clusters(&[("x", 1), ("y", 1)]));
        assert!(matches!(
            result,
            Err(StaseError::ComputationDivision { metric: "divergence" })
        ));
    }

    #[test]
    fn test_single_detection_fails_genericity() {
        let columns = ColumnProfile {
            columns: vec![column("a", 1, 1, Some(0.0)), column("b", 0, 0, Some(0.0))],
        };
        let rows = RowProfile {
            rows: vec![row("r1", 1, 1, 1, None)],
        };
        let result = compute_metrics(1, 2, &columns, &rows, &clusters(&[("x", 1)]));
        assert!(matches!(
            result,
            Err(StaseError::ComputationDivision { metric: "genericity" })
        ));
    }

    #[test]
    fn test_single_labeler_fails_synchronicity() {
        let columns = ColumnProfile {
            columns: vec![column("a", 2, 0, None)],
        };
        let rows = RowProfile {
            rows: vec![row("r1", 1, 1, 1, None), row("r2", 1, 1, 1, None)],
        };
        let result = compute_metrics(2, 1, &columns, &rows, &clusters(&[("x", 2)]));
        assert!(matches!(
            result,
            Err(StaseError::ComputationDivision { metric: "synchronicity" })
        ));
    }

    #[test]
    fn test_no_similarity_fails_resemblance() {
        let columns = ColumnProfile {
            columns: vec![column("a", 2, 1, Some(1.0)), column("b", 1, 0, Some(1.0))],
        };
        let rows = RowProfile {
            rows: vec![row("r1", 2, 2, 1, None), row("r2", 1, 1, 1, None)],
        };
        let result = compute_metrics(2, 2, &columns, &rows, &clusters(&[("x", 2), ("y", 1)]));
        assert!(matches!(
            result,
            Err(StaseError::ComputationDivision { metric: "resemblance" })
        ));
    }
}
