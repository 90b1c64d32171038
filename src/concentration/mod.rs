//! Concentration indices over frequency distributions.

mod ouroboros;

pub use ouroboros::{ouroboros, ouroboros_counts, Ouroboros};
