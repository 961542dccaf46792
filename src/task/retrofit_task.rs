//! Background Retrofitting Task
//!
//! Runs the engine on Tokio's blocking pool and reports back over channels:
//! per-iteration progress on an unbounded mpsc channel, completion or
//! failure through the join handle. Cancellation is checked at iteration
//! boundaries only, so a pass is never left half-applied.

use futures::Stream;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::{RetrofitError, Result};
use crate::retrofit::{RetrofitConfig, RetrofitReport, Retrofitter};
use crate::vector::{Lexicon, VectorSpace};

/// Progress notification, sent after each completed iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based index of the iteration just completed
    pub iteration: usize,
    pub total: usize,
}

impl Progress {
    /// Completed share of the run in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.iteration as f64 / self.total as f64
    }
}

/// A finished run, with the vectors shared so readers never copy them
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub vectors: Arc<VectorSpace>,
    pub report: RetrofitReport,
}

/// Handle to a retrofitting run executing on a worker thread
pub struct RetrofitTask {
    progress: mpsc::UnboundedReceiver<Progress>,
    cancel: CancellationToken,
    handle: JoinHandle<Result<CompletedRun>>,
}

impl RetrofitTask {
    /// Start a run
    ///
    /// Must be called from within a Tokio runtime. The configuration is
    /// validated before anything is spawned.
    pub fn spawn(original: Arc<VectorSpace>, lexicon: Arc<Lexicon>, config: RetrofitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::spawn_with(original, lexicon, config, |_| {}))
    }

    /// Start a run and call `on_finish` on the worker once it ends, before
    /// the result becomes visible through [`join`](Self::join)
    pub(crate) fn spawn_with<H>(
        original: Arc<VectorSpace>,
        lexicon: Arc<Lexicon>,
        config: RetrofitConfig,
        on_finish: H,
    ) -> Self
    where
        H: FnOnce(&Result<CompletedRun>) + Send + 'static,
    {
        Self::spawn_job(retrofit_job(original, lexicon, config), on_finish)
    }

    /// Run `job` on the blocking pool, wiring its iteration callback to the
    /// progress channel and its stop check to the cancellation token
    pub(crate) fn spawn_job<J, H>(job: J, on_finish: H) -> Self
    where
        J: FnOnce(&mut dyn FnMut(usize, usize), &dyn Fn() -> bool) -> Result<CompletedRun> + Send + 'static,
        H: FnOnce(&Result<CompletedRun>) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut on_iteration = |iteration: usize, total: usize| {
                    // Receiver may already be gone; the run still completes
                    let _ = tx.send(Progress { iteration, total });
                };
                let should_stop = || token.is_cancelled();
                job(&mut on_iteration, &should_stop)
            }))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                error!(message = %message, "Retrofitting worker panicked");
                Err(RetrofitError::ComputationFailed(message))
            });

            drop(tx);
            on_finish(&result);
            result
        });

        debug!("Retrofitting task spawned");

        Self {
            progress: rx,
            cancel,
            handle,
        }
    }

    /// Next progress notification; `None` once the run has ended and all
    /// notifications were consumed
    pub async fn progress(&mut self) -> Option<Progress> {
        self.progress.recv().await
    }

    /// Progress notifications as a stream
    pub fn progress_stream(&mut self) -> impl Stream<Item = Progress> + '_ {
        futures::stream::poll_fn(move |cx| self.progress.poll_recv(cx))
    }

    /// Non-blocking poll for a pending progress notification
    pub fn try_progress(&mut self) -> Option<Progress> {
        self.progress.try_recv().ok()
    }

    /// Ask the run to stop before its next iteration
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this run, for wiring into other tasks
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to end
    pub async fn join(self) -> Result<CompletedRun> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(RetrofitError::ComputationFailed(e.to_string())),
        }
    }

    /// Drain progress into `on_progress`, then wait for the result
    pub async fn wait_with_progress<F>(mut self, mut on_progress: F) -> Result<CompletedRun>
    where
        F: FnMut(Progress),
    {
        while let Some(progress) = self.progress().await {
            on_progress(progress);
        }
        self.join().await
    }
}

/// Worker body for a retrofitting run over shared inputs
pub(crate) fn retrofit_job(
    original: Arc<VectorSpace>,
    lexicon: Arc<Lexicon>,
    config: RetrofitConfig,
) -> impl FnOnce(&mut dyn FnMut(usize, usize), &dyn Fn() -> bool) -> Result<CompletedRun> + Send + 'static {
    move |on_iteration: &mut dyn FnMut(usize, usize), should_stop: &dyn Fn() -> bool| {
        let outcome = Retrofitter::new(&original, &lexicon, config)?.run_until(on_iteration, should_stop)?;
        Ok(CompletedRun {
            vectors: Arc::new(outcome.vectors),
            report: outcome.report,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
