//! Pre/Post Similarity Comparison
//!
//! Cosine similarity of every lexicon edge before and after retrofitting.
//! Diagnostic only.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::vector::{cosine_similarity, Lexicon, VectorSpace};

/// Similarity of one (word, neighbor) lexicon edge
#[derive(Debug, Clone, PartialEq)]
pub struct PairSimilarity {
    pub word: String,
    pub neighbor: String,
    pub before: f64,
    /// Filled in once retrofitted vectors exist for both endpoints
    pub after: Option<f64>,
}

impl PairSimilarity {
    /// `after - before`
    pub fn difference(&self) -> Option<f64> {
        self.after.map(|after| after - self.before)
    }
}

/// Edge similarities ordered by `(word, neighbor)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityComparison {
    pairs: Vec<PairSimilarity>,
}

impl SimilarityComparison {
    /// Score every edge whose endpoints both have an original vector
    pub fn before(original: &VectorSpace, lexicon: &Lexicon) -> Self {
        let mut edges: BTreeMap<(&str, &str), f64> = BTreeMap::new();

        for (word, neighbors) in lexicon.iter() {
            let Some(word_vec) = original.get(word) else {
                continue;
            };
            for neighbor in neighbors {
                if let Some(neighbor_vec) = original.get(neighbor) {
                    edges.insert((word, neighbor.as_str()), cosine_similarity(word_vec, neighbor_vec));
                }
            }
        }

        debug!(pairs = edges.len(), "Pre-retrofit similarities computed");

        let pairs = edges
            .into_iter()
            .map(|((word, neighbor), before)| PairSimilarity {
                word: word.to_string(),
                neighbor: neighbor.to_string(),
                before,
                after: None,
            })
            .collect();
        Self { pairs }
    }

    /// Fill in post-retrofit similarities from `retrofitted`
    pub fn record_after(&mut self, retrofitted: &VectorSpace) {
        for pair in &mut self.pairs {
            pair.after = match (retrofitted.get(&pair.word), retrofitted.get(&pair.neighbor)) {
                (Some(a), Some(b)) => Some(cosine_similarity(a, b)),
                _ => None,
            };
        }

        if let Some(mean) = self.mean_difference() {
            info!(pairs = self.pairs.len(), mean_difference = mean, "Pre/post similarity comparison");
        }
    }

    pub fn pairs(&self) -> &[PairSimilarity] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Average signed change over edges that have an `after` value
    pub fn mean_difference(&self) -> Option<f64> {
        let diffs: Vec<f64> = self.pairs.iter().filter_map(PairSimilarity::difference).collect();
        if diffs.is_empty() {
            None
        } else {
            Some(diffs.iter().sum::<f64>() / diffs.len() as f64)
        }
    }
}
