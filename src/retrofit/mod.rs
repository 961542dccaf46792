//! Retrofitting Module
//!
//! The iterative refinement algorithm, its configuration and diagnostics.

mod config;
mod engine;
mod report;

pub use config::RetrofitConfig;
pub use engine::{retrofit, RetrofitOutcome, Retrofitter};
pub use report::{IterationStats, RetrofitReport};
