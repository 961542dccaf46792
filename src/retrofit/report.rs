//! Run Diagnostics
//!
//! Per-iteration statistics returned alongside the retrofitted vectors.

use std::time::Duration;

/// Counters for a single pass over the vocabulary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationStats {
    /// 1-based iteration index
    pub iteration: usize,
    /// Words whose vector was recomputed
    pub updated_words: usize,
    /// Words skipped because their neighbor list was empty
    pub empty_neighbor_lists: usize,
    /// Words skipped because none of their neighbors has a vector
    pub missing_neighbor_words: usize,
}

/// Diagnostics for a complete run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrofitReport {
    /// Size of the lexicon/space intersection
    pub vocabulary_size: usize,
    pub iterations: Vec<IterationStats>,
    pub elapsed: Duration,
}

impl RetrofitReport {
    /// Number of completed iterations
    pub fn completed_iterations(&self) -> usize {
        self.iterations.len()
    }

    /// Words updated in the final pass
    pub fn final_updated_words(&self) -> usize {
        self.iterations.last().map(|s| s.updated_words).unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        format!(
            "Vocabulary: {} | Iterations: {} | Updated per pass: {} | Elapsed: {:.2}s",
            self.vocabulary_size,
            self.completed_iterations(),
            self.final_updated_words(),
            self.elapsed.as_secs_f64()
        )
    }
}
