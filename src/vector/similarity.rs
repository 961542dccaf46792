//! Vector Similarity Functions
//!
//! Dot products, norms and cosine similarity over `f64` embeddings.

use crate::error::{RetrofitError, Result};

/// Additive term in the cosine denominator so zero vectors score 0 instead of NaN
pub const COSINE_EPSILON: f64 = 1e-10;

/// Smoothing added under the square root when unit-normalising loaded vectors
pub const LOAD_NORM_SMOOTHING: f64 = 1e-6;

/// Compute dot product of two vectors
///
/// Uses unrolled loop for better CPU performance.
#[inline]
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let len = a.len();
    let mut sum = 0.0f64;

    let chunks = len / 4;
    let remainder = len % 4;

    for i in 0..chunks {
        let idx = i * 4;
        sum += a[idx] * b[idx];
        sum += a[idx + 1] * b[idx + 1];
        sum += a[idx + 2] * b[idx + 2];
        sum += a[idx + 3] * b[idx + 3];
    }

    for i in (len - remainder)..len {
        sum += a[i] * b[i];
    }

    sum
}

/// L2 norm
#[inline]
pub fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine similarity: `dot / (|a| * |b| + 1e-10)`
///
/// Callers must pass vectors of equal length; use
/// [`checked_cosine_similarity`] when that is not already guaranteed.
#[inline]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let dot = dot_product(a, b);
    dot / (magnitude(a) * magnitude(b) + COSINE_EPSILON)
}

/// Cosine similarity that rejects mismatched lengths instead of misreading them
pub fn checked_cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(RetrofitError::dimension("cosine similarity", a.len(), b.len()));
    }
    Ok(cosine_similarity(a, b))
}

/// Unit-normalise a freshly loaded vector in place, dividing by `sqrt(sum(x^2) + 1e-6)`
pub fn normalize_smoothed(v: &mut [f64]) {
    let norm = (v.iter().map(|x| x * x).sum::<f64>() + LOAD_NORM_SMOOTHING).sqrt();
    for x in v.iter_mut() {
        *x /= norm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product() {
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b = vec![5.0, 4.0, 3.0, 2.0, 1.0];
        assert!((dot_product(&a, &b) - 35.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![0.3, -1.2, 4.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_similarity_symmetric() {
        let a = vec![0.1, 0.7, -0.2, 0.9, 0.05];
        let b = vec![-0.4, 0.3, 0.8, 0.1, 0.6];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_zero_vector_is_finite() {
        let z = vec![0.0, 0.0];
        let a = vec![1.0, 0.0];
        let sim = cosine_similarity(&z, &a);
        assert!(sim.is_finite());
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_checked_cosine_rejects_mismatch() {
        let err = checked_cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            RetrofitError::DimensionMismatch { expected: 2, got: 3, .. }
        ));
    }

    #[test]
    fn test_normalize_smoothed() {
        let mut v = vec![3.0, 4.0];
        normalize_smoothed(&mut v);
        // sqrt(25 + 1e-6) is a hair above 5
        assert!((magnitude(&v) - 1.0).abs() < 1e-7);
        assert!(v[0] < 0.6 && (v[0] - 0.6).abs() < 1e-7);
    }

    #[test]
    fn test_normalize_zero_vector_stays_zero() {
        let mut v = vec![0.0, 0.0, 0.0];
        normalize_smoothed(&mut v);
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
