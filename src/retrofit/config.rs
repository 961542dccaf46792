//! Retrofitting Configuration

use crate::error::{RetrofitError, Result};

/// Parameters for one retrofitting run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrofitConfig {
    /// Number of full passes over the vocabulary
    pub iterations: usize,

    /// Weight on a word's own original vector
    pub alpha: f64,

    /// Weight on each neighbor's current vector
    pub beta: f64,
}

impl Default for RetrofitConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            alpha: 1.0,
            beta: 1.0,
        }
    }
}

impl RetrofitConfig {
    /// Create a configuration with explicit values
    pub fn new(iterations: usize, alpha: f64, beta: f64) -> Self {
        Self {
            iterations,
            alpha,
            beta,
        }
    }

    /// Set the number of passes
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the original-vector weight
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the neighbor weight
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Reject degenerate parameters before any work starts
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(RetrofitError::InvalidConfig(
                "iterations must be at least 1".to_string(),
            ));
        }
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RetrofitError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.alpha == 0.0 && self.beta == 0.0 {
            return Err(RetrofitError::InvalidConfig(
                "alpha and beta cannot both be zero".to_string(),
            ));
        }
        Ok(())
    }
}
