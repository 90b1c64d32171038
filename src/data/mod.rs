//! Data structures for labeled datasets.

mod label_matrix;

pub use label_matrix::LabelMatrix;
