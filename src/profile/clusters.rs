//! Global label clustering: how often each label occurs across the table.

use crate::data::LabelMatrix;
use crate::error::{Result, StaseError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One label and its number of occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Occurrence counts of every label present in the table.
///
/// Ordered by count (descending), then label (ascending).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelClusters {
    pub clusters: Vec<LabelCount>,
}

impl LabelClusters {
    /// Number of distinct labels (O).
    pub fn n_labels(&self) -> usize {
        self.clusters.len()
    }

    /// Whether the table holds no label at all.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Occurrence count of a label, if present.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.clusters
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.count)
    }

    /// Occurrence counts in cluster order.
    pub fn counts(&self) -> Vec<usize> {
        self.clusters.iter().map(|c| c.count).collect()
    }

    /// Total occurrences over all labels.
    pub fn total(&self) -> usize {
        self.clusters.iter().map(|c| c.count).sum()
    }

    /// Write the clusters as a TSV table.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "label\tcount")?;
        for c in &self.clusters {
            writeln!(writer, "{}\t{}", c.label, c.count)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Tally every present cell by label.
///
/// Dictionary entries that no cell uses are not reported. A code outside
/// the dictionary fails as a `RowTask` naming the row that holds it.
pub fn cluster_labels(labels: &LabelMatrix) -> Result<LabelClusters> {
    let mut tally = vec![0usize; labels.labels().len()];
    for (row, row_vec) in labels.data().outer_iterator().enumerate() {
        for (col, &code) in row_vec.iter() {
            let slot = tally
                .get_mut(code as usize)
                .ok_or_else(|| StaseError::RowTask {
                    row: labels.row_ids()[row].clone(),
                    reason: format!(
                        "label code {} in column '{}' is not in the label dictionary",
                        code,
                        labels.column_ids()[col]
                    ),
                })?;
            *slot += 1;
        }
    }

    let mut clusters: Vec<LabelCount> = labels
        .labels()
        .iter()
        .zip(tally)
        .filter(|&(_, count)| count > 0)
        .map(|(label, count)| LabelCount {
            label: label.clone(),
            count,
        })
        .collect();
    clusters.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    Ok(LabelClusters { clusters })
}
