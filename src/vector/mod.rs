//! Vector Module
//!
//! Embedding storage, the semantic lexicon and similarity math.

mod lexicon;
mod similarity;
mod store;

pub use lexicon::{normalize_token, Lexicon, NUM_TOKEN, PUNC_TOKEN};
pub use similarity::{
    checked_cosine_similarity, cosine_similarity, dot_product, magnitude, normalize_smoothed,
    COSINE_EPSILON, LOAD_NORM_SMOOTHING,
};
pub use store::{Vector, VectorSpace};
