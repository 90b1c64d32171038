//! Sparse label matrix: entities × labelers, each cell an optional label.

use crate::config::StaseConfig;
use crate::error::{Result, StaseError};
use rayon::prelude::*;
use sprs::{CsMat, TriMat};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A sparse matrix of labels assigned by labelers (columns) to entities (rows).
///
/// Labels are interned: the matrix stores `u32` codes into a label
/// dictionary, and absent cells are simply not stored.
/// Uses CSR (Compressed Sparse Row) format for efficient row-wise operations.
#[derive(Debug, Clone)]
pub struct LabelMatrix {
    /// Sparse matrix in CSR format (entities × labelers) of label codes
    data: CsMat<u32>,
    /// Label dictionary, indexed by code
    labels: Vec<String>,
    /// Entity identifiers (row names)
    row_ids: Vec<String>,
    /// Labeler identifiers (column names)
    column_ids: Vec<String>,
}

/// Interns label strings into dense codes while a matrix is being built.
#[derive(Debug, Default)]
struct LabelInterner {
    codes: HashMap<String, u32>,
    labels: Vec<String>,
}

impl LabelInterner {
    fn intern(&mut self, label: &str) -> Result<u32> {
        if let Some(&code) = self.codes.get(label) {
            return Ok(code);
        }
        let code = u32::try_from(self.labels.len()).map_err(|_| {
            StaseError::InvalidParameter("Too many distinct labels for u32 codes".to_string())
        })?;
        self.codes.insert(label.to_string(), code);
        self.labels.push(label.to_string());
        Ok(code)
    }

    fn into_labels(self) -> Vec<String> {
        self.labels
    }
}

impl LabelMatrix {
    /// Create a new LabelMatrix from a sparse code matrix, its dictionary, and identifiers.
    ///
    /// Codes are not checked against the dictionary here; an undecodable code
    /// surfaces as a row or column failure when statistics are computed.
    pub fn new(
        data: CsMat<u32>,
        labels: Vec<String>,
        row_ids: Vec<String>,
        column_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != row_ids.len() {
            return Err(StaseError::DimensionMismatch {
                expected: nrows,
                actual: row_ids.len(),
            });
        }
        if ncols != column_ids.len() {
            return Err(StaseError::DimensionMismatch {
                expected: ncols,
                actual: column_ids.len(),
            });
        }
        let data = if data.is_csr() {
            data
        } else {
            data.to_other_storage()
        };
        Ok(Self {
            data,
            labels,
            row_ids,
            column_ids,
        })
    }

    /// Build a matrix from dense rows of optional labels.
    pub fn from_dense<S: AsRef<str>>(
        cells: &[Vec<Option<S>>],
        row_ids: Vec<String>,
        column_ids: Vec<String>,
    ) -> Result<Self> {
        let n_rows = cells.len();
        let n_cols = column_ids.len();
        let mut interner = LabelInterner::default();
        let mut tri_mat = TriMat::new((n_rows, n_cols));

        for (row, row_cells) in cells.iter().enumerate() {
            if row_cells.len() != n_cols {
                return Err(StaseError::DimensionMismatch {
                    expected: n_cols,
                    actual: row_cells.len(),
                });
            }
            for (col, cell) in row_cells.iter().enumerate() {
                if let Some(label) = cell {
                    tri_mat.add_triplet(row, col, interner.intern(label.as_ref())?);
                }
            }
        }

        Self::new(tri_mat.to_csr(), interner.into_labels(), row_ids, column_ids)
    }

    /// Load a label matrix from a delimited file.
    ///
    /// Expected format:
    /// - First row: header with labeler IDs (first column is the entity ID header)
    /// - Subsequent rows: entity ID followed by one cell per labeler
    ///
    /// Cells matching one of the configured NA strings are absent.
    pub fn from_csv<P: AsRef<Path>>(path: P, config: &StaseConfig) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, config)
    }

    /// Load a label matrix from any reader, using the same format as [`from_csv`](Self::from_csv).
    pub fn from_reader<R: Read>(reader: R, config: &StaseConfig) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(config.delimiter_byte()?)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = reader.headers()?.clone();
        if header.len() < 2 {
            return Err(StaseError::EmptyData(
                "Input must have at least one labeler column".to_string(),
            ));
        }
        let column_ids: Vec<String> = header.iter().skip(1).map(|s| s.to_string()).collect();
        let n_cols = column_ids.len();

        let mut interner = LabelInterner::default();
        let mut triplets: Vec<(usize, usize, u32)> = Vec::new();
        let mut row_ids: Vec<String> = Vec::new();

        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != n_cols + 1 {
                return Err(StaseError::DimensionMismatch {
                    expected: n_cols + 1,
                    actual: record.len(),
                });
            }

            row_ids.push(record[0].to_string());

            for (col_idx, raw) in record.iter().skip(1).enumerate() {
                let cell = if config.trim { raw.trim() } else { raw };
                if config.is_na(cell) {
                    continue;
                }
                triplets.push((row_idx, col_idx, interner.intern(cell)?));
            }
        }

        let n_rows = row_ids.len();
        if n_rows == 0 {
            return Err(StaseError::EmptyData("No entities in input".to_string()));
        }

        let mut tri_mat = TriMat::new((n_rows, n_cols));
        for (row, col, code) in triplets {
            tri_mat.add_triplet(row, col, code);
        }

        Self::new(tri_mat.to_csr(), interner.into_labels(), row_ids, column_ids)
    }

    /// Write the label matrix as a delimited file (absent cells are empty).
    pub fn to_csv<P: AsRef<Path>>(&self, path: P, delimiter: u8) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(path)?;

        let mut header = Vec::with_capacity(self.n_columns() + 1);
        header.push("");
        header.extend(self.column_ids.iter().map(String::as_str));
        writer.write_record(&header)?;

        for (row, row_id) in self.row_ids.iter().enumerate() {
            let mut record = Vec::with_capacity(self.n_columns() + 1);
            record.push(row_id.as_str());
            for col in 0..self.n_columns() {
                record.push(self.get(row, col).unwrap_or(""));
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Get the label at (row, col), if present and decodable.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.get_code(row, col).and_then(|code| self.label(code))
    }

    /// Get the label code at (row, col), if present.
    #[inline]
    pub fn get_code(&self, row: usize, col: usize) -> Option<u32> {
        self.data.get(row, col).copied()
    }

    /// Decode a label code.
    #[inline]
    pub fn label(&self, code: u32) -> Option<&str> {
        self.labels.get(code as usize).map(String::as_str)
    }

    /// Number of entities (rows, M).
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.data.rows()
    }

    /// Number of labelers (columns, N).
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.data.cols()
    }

    /// Total number of present cells.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.data.nnz()
    }

    /// Label dictionary.
    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Entity identifiers.
    #[inline]
    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    /// Labeler identifiers.
    #[inline]
    pub fn column_ids(&self) -> &[String] {
        &self.column_ids
    }

    /// Get the underlying sparse matrix.
    #[inline]
    pub fn data(&self) -> &CsMat<u32> {
        &self.data
    }

    /// Present (column, code) pairs of one row, in column order.
    pub fn row_entries(&self, row: usize) -> Vec<(usize, u32)> {
        self.data
            .outer_view(row)
            .map(|v| v.iter().map(|(col, &code)| (col, code)).collect())
            .unwrap_or_default()
    }

    /// Present (row, code) pairs of every column, in row order.
    pub fn column_entries(&self) -> Vec<Vec<(usize, u32)>> {
        let mut columns = vec![Vec::new(); self.n_columns()];
        for (row, row_vec) in self.data.outer_iterator().enumerate() {
            for (col, &code) in row_vec.iter() {
                columns[col].push((row, code));
            }
        }
        columns
    }

    /// Number of present cells per row.
    pub fn row_positives(&self) -> Vec<usize> {
        (0..self.n_rows())
            .into_par_iter()
            .map(|row| self.data.outer_view(row).map(|v| v.nnz()).unwrap_or(0))
            .collect()
    }

    /// Number of present cells per column.
    pub fn column_positives(&self) -> Vec<usize> {
        let mut positives = vec![0usize; self.n_columns()];
        for row_vec in self.data.outer_iterator() {
            for (col, _) in row_vec.iter() {
                positives[col] += 1;
            }
        }
        positives
    }
}
