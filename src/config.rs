//! Engine and loader configuration.

use crate::error::{Result, StaseError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cell strings read as "no label" unless overridden.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Configuration for loading a label table and running the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaseConfig {
    /// Worker threads for row and column statistics (0 = all cores).
    pub threads: usize,
    /// CSV field delimiter.
    pub delimiter: char,
    /// Cell values treated as absent.
    pub na_values: Vec<String>,
    /// Trim surrounding whitespace from cells before the NA check.
    pub trim: bool,
}

impl Default for StaseConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            delimiter: ',',
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
            trim: false,
        }
    }
}

impl StaseConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(StaseError::from)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Set the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the CSV delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Check that the delimiter is usable by the CSV reader.
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() || self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(StaseError::InvalidParameter(format!(
                "Delimiter must be a single ASCII character other than a line break, got {:?}",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Delimiter as the byte expected by the CSV reader.
    pub fn delimiter_byte(&self) -> Result<u8> {
        self.validate()?;
        Ok(self.delimiter as u8)
    }

    /// Whether a raw cell string denotes an absent label.
    pub fn is_na(&self, cell: &str) -> bool {
        self.na_values.iter().any(|na| na == cell)
    }
}
