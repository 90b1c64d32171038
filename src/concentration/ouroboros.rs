//! Ouroboros index: how evenly a total is spread over a set of frequencies.

use crate::error::{Result, StaseError};
use serde::{Deserialize, Serialize};

/// Result of an Ouroboros computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ouroboros {
    /// Uniformity score in [0, 1]; 1 for a perfectly uniform distribution.
    pub index: f64,
    /// Number of largest elements needed to reach half of the total mass.
    pub indice: usize,
}

impl Ouroboros {
    /// Result for sequences with at most one element.
    pub const TRIVIAL: Self = Self {
        index: 1.0,
        indice: 1,
    };
}

/// Compute the Ouroboros index of a sequence of frequencies.
///
/// The largest elements are accumulated until they carry at least half of
/// the total. The count of elements taken, corrected by how much their share
/// exceeds the share the same count would carry under a uniform distribution,
/// is normalized by `ceil(N / 2)`.
///
/// # Errors
/// - `InvalidParameter` if any frequency is negative or not finite
/// - `DegenerateInput` if there are at least two frequencies and they sum to zero
pub fn ouroboros(frequencies: &[f64]) -> Result<Ouroboros> {
    if let Some(bad) = frequencies.iter().find(|f| !f.is_finite() || **f < 0.0) {
        return Err(StaseError::InvalidParameter(format!(
            "Frequencies must be finite and non-negative, got {}",
            bad
        )));
    }

    let n = frequencies.len();
    if n <= 1 {
        return Ok(Ouroboros::TRIVIAL);
    }

    let mut sorted = frequencies.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let total: f64 = sorted.iter().sum();
    if total == 0.0 {
        return Err(StaseError::DegenerateInput(format!(
            "Ouroboros index of {} frequencies summing to zero",
            n
        )));
    }

    let half = total / 2.0;
    let mut acc = 0.0;
    let mut indice = 0usize;
    for &value in sorted.iter().rev() {
        if acc >= half {
            break;
        }
        acc += value;
        indice += 1;
    }

    let imax = n.div_ceil(2) as f64;
    let pmin = imax / n as f64;
    let p = acc / total;
    let excess = (p - pmin) / (1.0 - pmin);
    let index = (indice as f64 - excess) / imax;

    Ok(Ouroboros { index, indice })
}

/// Ouroboros index of integer counts.
pub fn ouroboros_counts(counts: &[usize]) -> Result<Ouroboros> {
    let frequencies: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    ouroboros(&frequencies)
}
