//! Persistence Module
//!
//! Plain-text loaders for word vectors and lexicons, and the vector exporter.

mod text;

pub use text::{parse_lexicon, parse_word_vectors, read_lexicon, read_word_vectors, write_word_vectors};
