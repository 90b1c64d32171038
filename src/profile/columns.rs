//! Per-labeler statistics: coverage, exclusive detections and pairwise overlap.

use super::presence::{presence_vectors, OverlapCounts, PresenceVector};
use super::summary::{format_optional, Summary};
use crate::data::LabelMatrix;
use crate::error::{Result, StaseError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Statistics for a single labeler (column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Labeler identifier.
    pub column_id: String,
    /// Number of rows this labeler labels.
    pub positives: usize,
    /// Number of rows labeled by this labeler and no other.
    pub alones: usize,
    /// Number of distinct labels this labeler emits.
    pub distincts: usize,
    /// Overlap coefficient against every other labeler; `None` with a single labeler.
    pub overlap: Option<Summary>,
}

/// Statistics for all labelers, in column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub columns: Vec<ColumnStats>,
}

impl ColumnProfile {
    /// Number of labelers.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the profile has no labelers.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a labeler by identifier.
    pub fn get(&self, column_id: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|c| c.column_id == column_id)
    }

    /// Positives per labeler.
    pub fn positives(&self) -> Vec<usize> {
        self.columns.iter().map(|c| c.positives).collect()
    }

    /// Total positives over all labelers.
    pub fn total_positives(&self) -> usize {
        self.columns.iter().map(|c| c.positives).sum()
    }

    /// Total exclusive detections over all labelers.
    pub fn total_alones(&self) -> usize {
        self.columns.iter().map(|c| c.alones).sum()
    }

    /// Mean overlap of each labeler that has one.
    pub fn overlap_means(&self) -> Vec<f64> {
        self.columns
            .iter()
            .filter_map(|c| c.overlap.map(|o| o.mean))
            .collect()
    }

    /// Write the profile as a TSV table.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "column_id\tpositives\talones\tdistincts\toverlap\toverlap_min\toverlap_max"
        )?;
        for c in &self.columns {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                c.column_id,
                c.positives,
                c.alones,
                c.distincts,
                format_optional(c.overlap.map(|o| o.mean)),
                format_optional(c.overlap.map(|o| o.min)),
                format_optional(c.overlap.map(|o| o.max)),
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Compute per-labeler statistics.
///
/// Columns are processed in parallel on the current rayon pool. Overlap for a
/// pair of labelers compares their presence vectors only, never their labels.
///
/// # Errors
/// `ColumnTask` naming the first labeler whose statistics cannot be computed.
pub fn column_stats(labels: &LabelMatrix) -> Result<ColumnProfile> {
    let n_rows = labels.n_rows();
    let row_positives = labels.row_positives();
    let entries = labels.column_entries();
    let vectors = presence_vectors(labels);

    let columns = (0..labels.n_columns())
        .into_par_iter()
        .map(|col| {
            single_column(
                labels,
                col,
                &entries[col],
                &row_positives,
                &vectors,
                n_rows,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ColumnProfile { columns })
}

fn single_column(
    labels: &LabelMatrix,
    col: usize,
    entries: &[(usize, u32)],
    row_positives: &[usize],
    vectors: &[PresenceVector],
    n_rows: usize,
) -> Result<ColumnStats> {
    let column_id = &labels.column_ids()[col];
    let fail = |reason: String| StaseError::ColumnTask {
        column: column_id.clone(),
        reason,
    };

    let mut distinct_codes = HashSet::new();
    for &(row, code) in entries {
        if labels.label(code).is_none() {
            return Err(fail(format!(
                "label code {} at row '{}' is not in the label dictionary",
                code,
                labels.row_ids()[row]
            )));
        }
        distinct_codes.insert(code);
    }

    let alones = entries
        .iter()
        .filter(|&&(row, _)| row_positives[row] == 1)
        .count();

    let own = &vectors[col];
    let mut overlaps = Vec::with_capacity(vectors.len().saturating_sub(1));
    for (other, vector) in vectors.iter().enumerate() {
        if other == col {
            continue;
        }
        let counts = OverlapCounts::between(own, vector);
        if counts.total() != n_rows {
            return Err(fail(format!(
                "overlap counts against '{}' sum to {} instead of {}",
                labels.column_ids()[other],
                counts.total(),
                n_rows
            )));
        }
        overlaps.push(counts.coefficient());
    }

    Ok(ColumnStats {
        column_id: column_id.clone(),
        positives: entries.len(),
        alones,
        distincts: distinct_codes.len(),
        overlap: Summary::from_values(&overlaps),
    })
}

impl std::fmt::Display for ColumnProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Column Profile ({} labelers)", self.columns.len())?;
        for c in &self.columns {
            writeln!(
                f,
                "  {:<20} positives={:<6} alones={:<6} distincts={:<6} overlap={}",
                c.column_id,
                c.positives,
                c.alones,
                c.distincts,
                format_optional(c.overlap.map(|o| o.mean)),
            )?;
        }
        Ok(())
    }
}
