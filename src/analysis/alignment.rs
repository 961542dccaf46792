//! Alignment Filter
//!
//! Finds words whose retrofitted vector still points the same way as the
//! original one.

use std::collections::BTreeMap;
use tracing::{info, trace, warn};

use crate::error::{RetrofitError, Result};
use crate::vector::{cosine_similarity, VectorSpace};

/// Filter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    /// Minimum original/retrofitted cosine similarity for a word to pass
    pub threshold: f64,
    /// How many best-aligned words to report
    pub top_n: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            top_n: 10,
        }
    }
}

impl FilterConfig {
    /// Set the minimum similarity
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set how many words the ranking keeps
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// Words that met the threshold and their similarities
#[derive(Debug, Clone, PartialEq)]
pub struct FilterMatches {
    pub threshold: f64,
    /// Words present in both spaces
    pub examined: usize,
    /// Passing word -> similarity
    pub similarities: BTreeMap<String, f64>,
    /// Mean similarity over the passing words only
    pub average: f64,
}

impl FilterMatches {
    pub fn len(&self) -> usize {
        self.similarities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.similarities.is_empty()
    }

    /// Passing words in lexical order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.similarities.keys().map(String::as_str)
    }

    /// The `n` best-aligned words, most similar first
    pub fn top(&self, n: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .similarities
            .iter()
            .map(|(w, s)| (w.as_str(), *s))
            .collect();
        // BTreeMap iteration is lexical and sort_by is stable, so ties stay lexical
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(n);
        ranked
    }
}

/// Result of a filtering run
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// At least one word met the threshold
    Matched(FilterMatches),
    /// No word met the threshold; `examined` tells apart "nothing compared"
    NoMatches { threshold: f64, examined: usize },
}

impl FilterOutcome {
    pub fn matches(&self) -> Option<&FilterMatches> {
        match self {
            FilterOutcome::Matched(m) => Some(m),
            FilterOutcome::NoMatches { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FilterOutcome::NoMatches { .. })
    }

    /// Number of words compared
    pub fn examined(&self) -> usize {
        match self {
            FilterOutcome::Matched(m) => m.examined,
            FilterOutcome::NoMatches { examined, .. } => *examined,
        }
    }
}

/// Compare each shared word's original and retrofitted vector and keep
/// those with cosine similarity `>= threshold`
pub fn filter(original: &VectorSpace, retrofitted: &VectorSpace, threshold: f64) -> Result<FilterOutcome> {
    if let (Some(expected), Some(got)) = (original.dimension(), retrofitted.dimension()) {
        if expected != got {
            return Err(RetrofitError::dimension("filter spaces", expected, got));
        }
    }

    info!(threshold, "Starting filtering");

    let mut similarities = BTreeMap::new();
    let mut examined = 0usize;
    let mut total = 0.0f64;

    for (word, before) in original.iter() {
        let Some(after) = retrofitted.get(word) else {
            continue;
        };
        examined += 1;

        let similarity = cosine_similarity(before, after);
        if similarity >= threshold {
            trace!(word, similarity, "Word meets the threshold");
            total += similarity;
            similarities.insert(word.to_string(), similarity);
        }
    }

    if similarities.is_empty() {
        warn!(threshold, examined, "No words met the similarity threshold");
        return Ok(FilterOutcome::NoMatches { threshold, examined });
    }

    let average = total / similarities.len() as f64;
    info!(
        passed = similarities.len(),
        examined,
        average,
        "Filtering completed"
    );

    Ok(FilterOutcome::Matched(FilterMatches {
        threshold,
        examined,
        similarities,
        average,
    }))
}
