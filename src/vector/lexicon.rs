//! Semantic Lexicon
//!
//! Word -> related-words table (synonyms, hypernyms, ...) and the token
//! normalisation applied to lexicon entries.

use hashbrown::HashMap;

use super::store::VectorSpace;

/// Sentinel for tokens that start with a digit
pub const NUM_TOKEN: &str = "---num---";

/// Sentinel for tokens without any word character
pub const PUNC_TOKEN: &str = "---punc---";

/// Normalise a lexicon token
///
/// Leading digit -> [`NUM_TOKEN`], no `[A-Za-z0-9_]` character ->
/// [`PUNC_TOKEN`], anything else is lower-cased.
pub fn normalize_token(token: &str) -> String {
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        NUM_TOKEN.to_string()
    } else if !token.chars().any(|c| c.is_ascii_alphanumeric() || c == '_') {
        PUNC_TOKEN.to_string()
    } else {
        token.to_lowercase()
    }
}

/// Mapping from word to its ordered neighbor list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    entries: HashMap<String, Vec<String>>,
}

impl Lexicon {
    /// Create an empty lexicon
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a lexicon from `(word, neighbors)` pairs; later duplicates win
    pub fn from_entries<I, W, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (W, Vec<N>)>,
        W: Into<String>,
        N: Into<String>,
    {
        let mut lexicon = Self::new();
        for (word, neighbors) in entries {
            lexicon.insert(word, neighbors.into_iter().map(Into::into).collect());
        }
        lexicon
    }

    /// Set a word's neighbor list, returning the previous one
    pub fn insert(&mut self, word: impl Into<String>, neighbors: Vec<String>) -> Option<Vec<String>> {
        self.entries.insert(word.into(), neighbors)
    }

    /// Neighbors of `word`, if it has an entry
    pub fn neighbors(&self, word: &str) -> Option<&[String]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    /// Whether `word` has an entry
    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(w, n)| (w.as_str(), n.as_slice()))
    }

    /// Words present in both the lexicon and `space`, lexically sorted
    ///
    /// This is the retrofitting vocabulary; the sort fixes the update order.
    pub fn vocabulary(&self, space: &VectorSpace) -> Vec<String> {
        let mut words: Vec<String> = self
            .entries
            .keys()
            .filter(|w| space.contains(w))
            .cloned()
            .collect();
        words.sort_unstable();
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("Dog"), "dog");
        assert_eq!(normalize_token("42nd"), NUM_TOKEN);
        assert_eq!(normalize_token("1"), NUM_TOKEN);
        assert_eq!(normalize_token("..."), PUNC_TOKEN);
        assert_eq!(normalize_token("--"), PUNC_TOKEN);
        assert_eq!(normalize_token("well-known"), "well-known");
        assert_eq!(normalize_token("a1"), "a1");
        assert_eq!(normalize_token("_"), "_");
    }

    #[test]
    fn test_vocabulary_is_sorted_intersection() {
        let space = VectorSpace::from_entries([
            ("dog", vec![1.0, 0.0]),
            ("cat", vec![0.0, 1.0]),
            ("ant", vec![1.0, 1.0]),
        ])
        .unwrap();
        let lexicon = Lexicon::from_entries([
            ("dog", vec!["cat"]),
            ("ant", vec!["dog"]),
            ("unicorn", vec!["horse"]),
        ]);

        assert_eq!(lexicon.vocabulary(&space), vec!["ant", "dog"]);
    }

    #[test]
    fn test_neighbors_lookup() {
        let lexicon = Lexicon::from_entries([("happy", vec!["glad", "cheerful"])]);
        assert_eq!(
            lexicon.neighbors("happy"),
            Some(&["glad".to_string(), "cheerful".to_string()][..])
        );
        assert_eq!(lexicon.neighbors("sad"), None);
        assert_eq!(lexicon.len(), 1);
    }
}
