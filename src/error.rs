//! Error Types
//!
//! Failure taxonomy shared by the loaders, the retrofitting engine and the
//! background task layer.

use std::io;
use std::path::PathBuf;

/// Errors surfaced by retrofitter operations
#[derive(Debug, thiserror::Error)]
pub enum RetrofitError {
    /// Requested input file does not exist
    #[error("Input file does not exist: {}", .0.display())]
    InputMissing(PathBuf),

    /// I/O failure while reading or writing a file
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Vectors of differing length were stored, compared or combined
    #[error("Dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        got: usize,
    },

    /// Rejected run parameters (zero iterations, alpha = beta = 0, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An operation needed a retrofitted space but none has been produced yet
    #[error("No retrofitted vectors available; run retrofitting first")]
    NotRetrofitted,

    /// A retrofitting run is already active on this workspace
    #[error("A retrofitting run is already in progress")]
    RunInProgress,

    /// The run was cancelled at an iteration boundary
    #[error("Retrofitting cancelled")]
    Cancelled,

    /// The worker failed mid-run; no partial result is exposed
    #[error("Computation failed: {0}")]
    ComputationFailed(String),
}

impl RetrofitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        RetrofitError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn dimension(context: impl Into<String>, expected: usize, got: usize) -> Self {
        RetrofitError::DimensionMismatch {
            context: context.into(),
            expected,
            got,
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, RetrofitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_message() {
        let err = RetrofitError::dimension("word 'dog'", 300, 299);
        assert_eq!(
            err.to_string(),
            "Dimension mismatch in word 'dog': expected 300, got 299"
        );
    }

    #[test]
    fn test_io_source_preserved() {
        use std::error::Error;

        let err = RetrofitError::io("vectors.txt", io::Error::new(io::ErrorKind::Other, "boom"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("vectors.txt"));
    }
}
