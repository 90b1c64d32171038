//! Per-column presence vectors and pairwise overlap counts.

use crate::data::LabelMatrix;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Packed presence bits for one column: bit r is set iff row r has a label.
pub type PresenceVector = BitVec<u64, Lsb0>;

/// Build one presence vector per column.
pub fn presence_vectors(labels: &LabelMatrix) -> Vec<PresenceVector> {
    let n_rows = labels.n_rows();
    let mut vectors = vec![bitvec![u64, Lsb0; 0; n_rows]; labels.n_columns()];
    for (row, row_vec) in labels.data().outer_iterator().enumerate() {
        for (col, _) in row_vec.iter() {
            vectors[col].set(row, true);
        }
    }
    vectors
}

/// 2×2 contingency counts of two presence vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapCounts {
    /// Rows present in both.
    pub r11: usize,
    /// Rows present in the first only.
    pub r10: usize,
    /// Rows present in the second only.
    pub r01: usize,
    /// Rows present in neither.
    pub r00: usize,
}

impl OverlapCounts {
    /// Count the four cells for two vectors of equal length.
    ///
    /// Works word by word on the backing storage. Bits past the vector
    /// length in the last word are masked off.
    #[must_use]
    pub fn between(a: &PresenceVector, b: &PresenceVector) -> Self {
        debug_assert_eq!(a.len(), b.len());
        let len = a.len().min(b.len());
        let words = len.div_ceil(u64::BITS as usize);
        let tail = len % u64::BITS as usize;

        let mut counts = Self {
            r11: 0,
            r10: 0,
            r01: 0,
            r00: 0,
        };
        let pairs = a.as_raw_slice().iter().zip(b.as_raw_slice()).take(words);
        for (i, (&x, &y)) in pairs.enumerate() {
            let mask = if i + 1 == words && tail != 0 {
                (1u64 << tail) - 1
            } else {
                u64::MAX
            };
            counts.r11 += (x & y & mask).count_ones() as usize;
            counts.r10 += (x & !y & mask).count_ones() as usize;
            counts.r01 += (!x & y & mask).count_ones() as usize;
            counts.r00 += (!(x | y) & mask).count_ones() as usize;
        }
        counts
    }

    /// Sum of all four cells; equals the vector length when counting is consistent.
    pub fn total(&self) -> usize {
        self.r11 + self.r10 + self.r01 + self.r00
    }

    /// Overlap coefficient `r11 / (r11 + min(r10, r01))`, 0 when nothing is shared.
    pub fn coefficient(&self) -> f64 {
        let divisor = self.r11 + self.r10.min(self.r01);
        if self.r11 == 0 || divisor == 0 {
            return 0.0;
        }
        self.r11 as f64 / divisor as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vector(bits: &[bool]) -> PresenceVector {
        bits.iter().copied().collect()
    }

    #[test]
    fn test_counts() {
        let a = vector(&[true, true, false, false, true]);
        let b = vector(&[true, false, true, false, false]);
        let counts = OverlapCounts::between(&a, &b);
        assert_eq!(
            counts,
            OverlapCounts {
                r11: 1,
                r10: 2,
                r01: 1,
                r00: 1
            }
        );
        assert_eq!(counts.total(), 5);
        assert!((counts.coefficient() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_subset_overlaps_fully() {
        // The rarer column is entirely covered by the other
        let a = vector(&[true, true, true, false]);
        let b = vector(&[false, true, false, false]);
        assert!((OverlapCounts::between(&a, &b).coefficient() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_and_empty() {
        let a = vector(&[true, false]);
        let b = vector(&[false, true]);
        assert_eq!(OverlapCounts::between(&a, &b).coefficient(), 0.0);

        let empty = vector(&[false, false]);
        assert_eq!(OverlapCounts::between(&empty, &empty).coefficient(), 0.0);
    }

    #[test]
    fn test_counts_span_several_words() {
        let a: PresenceVector = (0..130).map(|i| i % 2 == 0).collect();
        let b: PresenceVector = (0..130).map(|i| i % 3 == 0).collect();
        let counts = OverlapCounts::between(&a, &b);
        // multiples of 6 in 0..130: 22; even: 65; multiples of 3: 44
        assert_eq!(
            counts,
            OverlapCounts {
                r11: 22,
                r10: 43,
                r01: 22,
                r00: 43
            }
        );
        assert_eq!(counts.total(), 130);
    }

    #[test]
    fn test_bits_past_length_ignored() {
        let mut a = bitvec![u64, Lsb0; 1; 70];
        a.truncate(65);
        let b = bitvec![u64, Lsb0; 0; 65];
        let counts = OverlapCounts::between(&a, &b);
        assert_eq!(counts.r10, 65);
        assert_eq!(counts.r01, 0);
        assert_eq!(counts.r00, 0);
        assert_eq!(counts.total(), 65);
    }

    #[test]
    fn test_presence_vectors() {
        let cells = vec![
            vec![Some("x"), Some("x")],
            vec![Some("y"), None],
            vec![None, Some("y")],
        ];
        let labels = LabelMatrix::from_dense(
            &cells,
            vec!["r1".into(), "r2".into(), "r3".into()],
            vec!["a".into(), "b".into()],
        )
        .unwrap();
        let vectors = presence_vectors(&labels);
        assert_eq!(vectors[0], vector(&[true, true, false]));
        assert_eq!(vectors[1], vector(&[true, false, true]));
    }

    proptest! {
        #[test]
        fn prop_symmetric_and_bounded(
            pairs in prop::collection::vec((any::<bool>(), any::<bool>()), 1..200)
        ) {
            let a: PresenceVector = pairs.iter().map(|p| p.0).collect();
            let b: PresenceVector = pairs.iter().map(|p| p.1).collect();
            let ab = OverlapCounts::between(&a, &b);
            let ba = OverlapCounts::between(&b, &a);
            prop_assert_eq!(ab.total(), pairs.len());
            prop_assert_eq!(ab.coefficient(), ba.coefficient());
            prop_assert!((0.0..=1.0).contains(&ab.coefficient()));
        }
    }
}
