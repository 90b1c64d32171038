//! Per-entity statistics: label agreement and pairwise label similarity.

use super::summary::{format_optional, Summary};
use crate::data::LabelMatrix;
use crate::error::{Result, StaseError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Statistics for a single entity (row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowStats {
    /// Entity identifier.
    pub row_id: String,
    /// Number of labelers that label this entity.
    pub positives: usize,
    /// Number of distinct labels assigned to this entity.
    pub distincts: usize,
    /// Occurrences of the most frequent label (mode frequency).
    pub max: usize,
    /// Jaro-Winkler similarity over all label pairs; `None` below two labels.
    pub similarity: Option<Summary>,
}

/// Statistics for all entities, in row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowProfile {
    pub rows: Vec<RowStats>,
}

impl RowProfile {
    /// Number of entities.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the profile has no entities.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total positives over all entities.
    pub fn total_positives(&self) -> usize {
        self.rows.iter().map(|r| r.positives).sum()
    }

    /// Total distinct labels, summed per entity.
    pub fn total_distincts(&self) -> usize {
        self.rows.iter().map(|r| r.distincts).sum()
    }

    /// Total mode frequencies, summed per entity.
    pub fn total_max(&self) -> usize {
        self.rows.iter().map(|r| r.max).sum()
    }

    /// Mean similarity of each entity where it is defined.
    pub fn similarity_means(&self) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|r| r.similarity.map(|s| s.mean))
            .collect()
    }

    /// Write the profile as a TSV table.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "row_id\tpositives\tdistincts\tmax\tresemblance\tresemblance_min\tresemblance_max"
        )?;
        for r in &self.rows {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                r.row_id,
                r.positives,
                r.distincts,
                r.max,
                format_optional(r.similarity.map(|s| s.mean)),
                format_optional(r.similarity.map(|s| s.min)),
                format_optional(r.similarity.map(|s| s.max)),
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Compute per-entity statistics.
///
/// Rows are independent and processed in parallel on the current rayon pool;
/// the result keeps the original row order.
///
/// # Errors
/// `RowTask` naming the first entity that has no label or holds a label code
/// missing from the dictionary.
pub fn row_stats(labels: &LabelMatrix) -> Result<RowProfile> {
    let rows = (0..labels.n_rows())
        .into_par_iter()
        .map(|row| single_row(labels, row))
        .collect::<Result<Vec<_>>>()?;

    Ok(RowProfile { rows })
}

fn single_row(labels: &LabelMatrix, row: usize) -> Result<RowStats> {
    let row_id = &labels.row_ids()[row];
    let fail = |reason: String| StaseError::RowTask {
        row: row_id.clone(),
        reason,
    };

    let entries = labels.row_entries(row);
    if entries.is_empty() {
        return Err(fail("no labeler assigned a label".to_string()));
    }

    let mut values: Vec<&str> = Vec::with_capacity(entries.len());
    for &(col, code) in &entries {
        let label = labels.label(code).ok_or_else(|| {
            fail(format!(
                "label code {} in column '{}' is not in the label dictionary",
                code,
                labels.column_ids()[col]
            ))
        })?;
        values.push(label);
    }

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for &value in &values {
        *occurrences.entry(value).or_insert(0) += 1;
    }
    let max = occurrences.values().copied().max().unwrap_or(0);

    Ok(RowStats {
        row_id: row_id.clone(),
        positives: values.len(),
        distincts: occurrences.len(),
        max,
        similarity: Summary::from_values(&pairwise_similarities(&values)),
    })
}

/// Jaro-Winkler similarity of every unordered pair of values.
///
/// Equal values in different positions are still distinct pair members.
pub fn pairwise_similarities(values: &[&str]) -> Vec<f64> {
    let n = values.len();
    let mut similarities = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            similarities.push(strsim::jaro_winkler(values[i], values[j]));
        }
    }
    similarities
}

impl std::fmt::Display for RowProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Row Profile ({} entities)", self.rows.len())?;
        writeln!(f, "  Total positives: {}", self.total_positives())?;
        writeln!(f, "  Total distincts: {}", self.total_distincts())?;
        writeln!(
            f,
            "  Entities with a similarity score: {}",
            self.similarity_means().len()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_matrix() -> LabelMatrix {
        let cells = vec![
            vec![Some("Trojan.Agent"), Some("Trojan.Agent"), Some("Trojan.Agent")],
            vec![Some("Trojan.Agent"), Some("Trojan.Agen"), Some("Worm.Mydoom")],
            vec![Some("Adware"), None, None],
        ];
        LabelMatrix::from_dense(
            &cells,
            vec!["f1".into(), "f2".into(), "f3".into()],
            vec!["av1".into(), "av2".into(), "av3".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_row_counts() {
        let profile = row_stats(&create_test_matrix()).unwrap();
        let ids: Vec<&str> = profile.rows.iter().map(|r| r.row_id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2", "f3"]);

        let f1 = &profile.rows[0];
        assert_eq!((f1.positives, f1.distincts, f1.max), (3, 1, 3));
        let f2 = &profile.rows[1];
        assert_eq!((f2.positives, f2.distincts, f2.max), (3, 3, 1));
        let f3 = &profile.rows[2];
        assert_eq!((f3.positives, f3.distincts, f3.max), (1, 1, 1));
    }

    #[test]
    fn test_identical_labels_fully_similar() {
        let profile = row_stats(&create_test_matrix()).unwrap();
        let similarity = profile.rows[0].similarity.unwrap();
        assert_eq!(similarity.mean, 1.0);
        assert_eq!(similarity.min, 1.0);
        assert_eq!(similarity.max, 1.0);
    }

    #[test]
    fn test_mixed_labels_similarity_range() {
        let profile = row_stats(&create_test_matrix()).unwrap();
        let similarity = profile.rows[1].similarity.unwrap();
        assert!(similarity.min < similarity.mean && similarity.mean < similarity.max);
        assert!(similarity.max < 1.0);
        assert!(similarity.min >= 0.0);
    }

    #[test]
    fn test_single_label_has_no_similarity() {
        let profile = row_stats(&create_test_matrix()).unwrap();
        assert!(profile.rows[2].similarity.is_none());
        assert_eq!(profile.similarity_means().len(), 2);
    }

    #[test]
    fn test_pair_enumeration() {
        assert_eq!(pairwise_similarities(&["a", "a", "a"]), vec![1.0, 1.0, 1.0]);
        assert!(pairwise_similarities(&["a"]).is_empty());
        assert_eq!(pairwise_similarities(&["a", "b", "c", "d"]).len(), 6);
    }

    #[test]
    fn test_empty_row_fails() {
        let cells = vec![vec![Some("a"), None], vec![None, None]];
        let labels = LabelMatrix::from_dense(
            &cells,
            vec!["f1".into(), "f2".into()],
            vec!["av1".into(), "av2".into()],
        )
        .unwrap();

        match row_stats(&labels) {
            Err(StaseError::RowTask { row, .. }) => assert_eq!(row, "f2"),
            other => panic!("expected row failure, got {:?}", other),
        }
    }
}
