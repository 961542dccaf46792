//! Analysis Module
//!
//! Similarity-based inspection of a retrofitting result.

mod alignment;
mod comparison;

pub use alignment::{filter, FilterConfig, FilterMatches, FilterOutcome};
pub use comparison::{PairSimilarity, SimilarityComparison};
