//! Task Module
//!
//! Long-running retrofitting work off the caller's thread, with progress
//! notifications, cancellation and single-run workspaces.

mod retrofit_task;
mod workspace;

pub use retrofit_task::{CompletedRun, Progress, RetrofitTask};
pub use workspace::Workspace;
