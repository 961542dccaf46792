//! Vector Space
//!
//! Word -> embedding storage with a single fixed dimensionality.

use hashbrown::HashMap;

use crate::error::{RetrofitError, Result};

/// A word embedding
pub type Vector = Vec<f64>;

/// Mapping from word to vector, all vectors sharing one dimension
///
/// The dimension is fixed by the first vector stored; later vectors of any
/// other length are rejected. `Clone` yields fully independent storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorSpace {
    vectors: HashMap<String, Vector>,
    dimension: Option<usize>,
}

impl VectorSpace {
    /// Create an empty space
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty space with room for `capacity` words
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vectors: HashMap::with_capacity(capacity),
            dimension: None,
        }
    }

    /// Build a space from `(word, vector)` pairs
    pub fn from_entries<I, W>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (W, Vector)>,
        W: Into<String>,
    {
        let mut space = Self::new();
        for (word, vector) in entries {
            space.put(word, vector)?;
        }
        Ok(space)
    }

    /// Dimension shared by every vector, `None` while empty
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Store a vector, returning the one it replaced
    pub fn put(&mut self, word: impl Into<String>, vector: Vector) -> Result<Option<Vector>> {
        let word = word.into();
        match self.dimension {
            Some(dim) if dim != vector.len() => {
                return Err(RetrofitError::dimension(
                    format!("vector for '{}'", word),
                    dim,
                    vector.len(),
                ));
            }
            Some(_) => {}
            None => self.dimension = Some(vector.len()),
        }
        Ok(self.vectors.insert(word, vector))
    }

    /// Look up a word's vector
    pub fn get(&self, word: &str) -> Option<&[f64]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    /// Check if word exists
    pub fn contains(&self, word: &str) -> bool {
        self.vectors.contains_key(word)
    }

    /// Get number of stored words
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Iterate over entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.vectors.iter().map(|(w, v)| (w.as_str(), v.as_slice()))
    }

    /// All words, lexically sorted
    pub fn sorted_words(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.vectors.keys().map(String::as_str).collect();
        words.sort_unstable();
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let mut space = VectorSpace::new();
        assert_eq!(space.dimension(), None);

        space.put("dog", vec![1.0, 0.0]).unwrap();
        assert_eq!(space.dimension(), Some(2));
        assert!(space.contains("dog"));
        assert!(!space.contains("cat"));
        assert_eq!(space.get("dog"), Some(&[1.0, 0.0][..]));
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn test_put_replaces() {
        let mut space = VectorSpace::new();
        space.put("dog", vec![1.0, 0.0]).unwrap();
        let old = space.put("dog", vec![0.0, 1.0]).unwrap();
        assert_eq!(old, Some(vec![1.0, 0.0]));
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut space = VectorSpace::new();
        space.put("dog", vec![1.0, 0.0]).unwrap();

        let err = space.put("cat", vec![1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            RetrofitError::DimensionMismatch { expected: 2, got: 3, .. }
        ));
        assert!(!space.contains("cat"));
    }

    #[test]
    fn test_absent_is_not_zero_vector() {
        let space = VectorSpace::from_entries([("zero", vec![0.0, 0.0])]).unwrap();
        assert_eq!(space.get("zero"), Some(&[0.0, 0.0][..]));
        assert_eq!(space.get("missing"), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = VectorSpace::from_entries([("dog", vec![1.0, 0.0])]).unwrap();
        let mut copy = original.clone();
        copy.put("dog", vec![0.5, 0.5]).unwrap();

        assert_eq!(original.get("dog"), Some(&[1.0, 0.0][..]));
        assert_eq!(copy.get("dog"), Some(&[0.5, 0.5][..]));
    }

    #[test]
    fn test_sorted_words() {
        let space = VectorSpace::from_entries([
            ("pear", vec![1.0]),
            ("apple", vec![1.0]),
            ("fig", vec![1.0]),
        ])
        .unwrap();
        assert_eq!(space.sorted_words(), vec!["apple", "fig", "pear"]);
    }
}
