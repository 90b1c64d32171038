//! Error types for the stase library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum StaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid table shape: {rows} rows x {columns} columns")]
    Shape { rows: usize, columns: usize },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Division by zero while computing metric '{metric}'")]
    ComputationDivision { metric: &'static str },

    #[error("Row '{row}' failed: {reason}")]
    RowTask { row: String, reason: String },

    #[error("Column '{column}' failed: {reason}")]
    ColumnTask { column: String, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, StaseError>;
