//! Retrofitter - Semantic Lexicon Retrofitting for Word Embeddings
//!
//! Pulls pre-trained word vectors toward the vectors of their lexicon
//! neighbors (synonyms, hypernyms, ...) while keeping each word anchored
//! to its original value, then measures how far every word moved.

pub mod analysis;
pub mod error;
pub mod metrics;
pub mod persistence;
pub mod retrofit;
pub mod task;
pub mod vector;

pub use analysis::{filter, FilterConfig, FilterMatches, FilterOutcome, PairSimilarity, SimilarityComparison};
pub use error::{Result, RetrofitError};
pub use metrics::Metrics;
pub use retrofit::{retrofit, IterationStats, RetrofitConfig, RetrofitOutcome, RetrofitReport, Retrofitter};
pub use task::{CompletedRun, Progress, RetrofitTask, Workspace};
pub use vector::{cosine_similarity, Lexicon, Vector, VectorSpace};
