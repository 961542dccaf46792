//! Retrofitting Engine
//!
//! Iteratively pulls each vocabulary word's vector toward the current
//! vectors of its lexicon neighbors while anchoring it to its original value:
//!
//! ```text
//! new[w] = (alpha * original[w] + beta * sum(current[n] for n in neighbors(w))) / (alpha + beta * |n|)
//! ```
//!
//! Words are processed in lexical order and each update is written back
//! immediately, so later words in the same pass read already-updated
//! neighbors. The fixed order keeps results reproducible.

use std::time::Instant;
use tracing::{debug, info, trace, warn};

use super::config::RetrofitConfig;
use super::report::{IterationStats, RetrofitReport};
use crate::error::{RetrofitError, Result};
use crate::vector::{Lexicon, Vector, VectorSpace};

/// Retrofitted vectors plus run diagnostics
#[derive(Debug, Clone)]
pub struct RetrofitOutcome {
    pub vectors: VectorSpace,
    pub report: RetrofitReport,
}

enum WordUpdate {
    Updated(Vector),
    EmptyNeighbors,
    MissingNeighbors,
}

/// One configured retrofitting run over borrowed inputs
pub struct Retrofitter<'a> {
    original: &'a VectorSpace,
    lexicon: &'a Lexicon,
    config: RetrofitConfig,
}

impl<'a> Retrofitter<'a> {
    /// Validate the configuration and bind the inputs
    pub fn new(original: &'a VectorSpace, lexicon: &'a Lexicon, config: RetrofitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            original,
            lexicon,
            config,
        })
    }

    pub fn config(&self) -> &RetrofitConfig {
        &self.config
    }

    /// Retrofitting vocabulary in processing order
    pub fn vocabulary(&self) -> Vec<String> {
        self.lexicon.vocabulary(self.original)
    }

    /// Run every iteration, calling `on_iteration(current, total)` after each pass
    pub fn run<F>(&self, on_iteration: F) -> Result<RetrofitOutcome>
    where
        F: FnMut(usize, usize),
    {
        self.run_until(on_iteration, || false)
    }

    /// Like [`run`](Self::run), but checks `should_stop` before every pass
    ///
    /// A pass, once started, always completes. When `should_stop` returns
    /// true the working copy is dropped and [`RetrofitError::Cancelled`] is
    /// returned.
    pub fn run_until<F, S>(&self, mut on_iteration: F, should_stop: S) -> Result<RetrofitOutcome>
    where
        F: FnMut(usize, usize),
        S: Fn() -> bool,
    {
        let start = Instant::now();
        let total = self.config.iterations;
        let mut working = self.original.clone();
        let vocabulary = self.vocabulary();

        info!(
            vocabulary = vocabulary.len(),
            words = self.original.len(),
            lexicon = self.lexicon.len(),
            iterations = total,
            alpha = self.config.alpha,
            beta = self.config.beta,
            "Starting retrofitting"
        );

        let mut report = RetrofitReport {
            vocabulary_size: vocabulary.len(),
            iterations: Vec::new(),
            elapsed: Default::default(),
        };

        for iteration in 1..=total {
            if should_stop() {
                info!(iteration, "Retrofitting cancelled before pass");
                return Err(RetrofitError::Cancelled);
            }

            let stats = self.pass(iteration, &vocabulary, &mut working)?;

            debug!(
                iteration,
                updated = stats.updated_words,
                "Iteration completed"
            );
            if stats.missing_neighbor_words > 0 {
                warn!(
                    iteration,
                    missing = stats.missing_neighbor_words,
                    "Words with no vectorized neighbors this iteration"
                );
            }

            report.iterations.push(stats);
            on_iteration(iteration, total);
        }

        report.elapsed = start.elapsed();
        info!("Retrofitting completed: {}", report.summary());

        Ok(RetrofitOutcome {
            vectors: working,
            report,
        })
    }

    fn pass(&self, iteration: usize, vocabulary: &[String], working: &mut VectorSpace) -> Result<IterationStats> {
        let mut stats = IterationStats {
            iteration,
            ..Default::default()
        };

        for word in vocabulary {
            match self.refine(word, working)? {
                WordUpdate::Updated(vector) => {
                    working.put(word.as_str(), vector)?;
                    stats.updated_words += 1;
                }
                WordUpdate::EmptyNeighbors => {
                    trace!(word = %word, "Skipping word with no neighbors");
                    stats.empty_neighbor_lists += 1;
                }
                WordUpdate::MissingNeighbors => {
                    stats.missing_neighbor_words += 1;
                }
            }
        }

        Ok(stats)
    }

    fn refine(&self, word: &str, working: &VectorSpace) -> Result<WordUpdate> {
        let neighbors = match self.lexicon.neighbors(word) {
            Some(neighbors) if !neighbors.is_empty() => neighbors,
            _ => return Ok(WordUpdate::EmptyNeighbors),
        };
        let original = self.original.get(word).ok_or_else(|| {
            RetrofitError::ComputationFailed(format!("vocabulary word '{}' has no original vector", word))
        })?;

        let alpha = self.config.alpha;
        let beta = self.config.beta;

        let mut sum = vec![0.0f64; original.len()];
        let mut total_weight = alpha;
        let mut valid = 0usize;

        for neighbor in neighbors {
            if let Some(current) = working.get(neighbor) {
                for (acc, x) in sum.iter_mut().zip(current) {
                    *acc += beta * x;
                }
                total_weight += beta;
                valid += 1;
            }
        }

        if valid == 0 {
            return Ok(WordUpdate::MissingNeighbors);
        }

        for (acc, x) in sum.iter_mut().zip(original) {
            *acc += alpha * x;
            *acc /= total_weight;
        }

        Ok(WordUpdate::Updated(sum))
    }
}

/// Retrofit `original` against `lexicon`
///
/// `on_iteration(current, total)` fires once per completed pass with a
/// 1-based index. `original` is never modified.
pub fn retrofit<F>(
    original: &VectorSpace,
    lexicon: &Lexicon,
    config: &RetrofitConfig,
    on_iteration: F,
) -> Result<VectorSpace>
where
    F: FnMut(usize, usize),
{
    Retrofitter::new(original, lexicon, *config)?
        .run(on_iteration)
        .map(|outcome| outcome.vectors)
}
