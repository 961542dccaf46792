//! Retrofitting Workspace
//!
//! Owns the loaded inputs and the most recent completed result. At most one
//! retrofitting run is active at a time; its result is swapped in only when
//! the run succeeds, so readers see either the previous result or the new
//! one, never a partially updated space.

use parking_lot::RwLock;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::retrofit_task::{retrofit_job, CompletedRun, RetrofitTask};
use crate::analysis::{filter, FilterOutcome, SimilarityComparison};
use crate::error::{RetrofitError, Result};
use crate::metrics::{Metrics, OperationStatus};
use crate::persistence::{read_lexicon, read_word_vectors, write_word_vectors};
use crate::retrofit::{RetrofitConfig, RetrofitReport};
use crate::vector::{Lexicon, VectorSpace};

/// Result of the last successful run
#[derive(Debug, Clone)]
struct LatestRun {
    run: CompletedRun,
    comparison: Arc<SimilarityComparison>,
}

#[derive(Debug, Default)]
struct Shared {
    latest: RwLock<Option<LatestRun>>,
    running: AtomicBool,
    metrics: Metrics,
}

/// Clears the running flag when the run ends, however it ends
struct RunGuard {
    shared: Arc<Shared>,
}

impl RunGuard {
    fn claim(shared: &Arc<Shared>) -> Result<Self> {
        shared
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RetrofitError::RunInProgress)?;
        Ok(Self {
            shared: Arc::clone(shared),
        })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
    }
}

/// Inputs plus latest retrofitting result
#[derive(Debug)]
pub struct Workspace {
    original: Arc<VectorSpace>,
    lexicon: Arc<Lexicon>,
    shared: Arc<Shared>,
}

impl Workspace {
    /// Create a workspace over already loaded inputs
    pub fn new(original: VectorSpace, lexicon: Lexicon) -> Self {
        Self {
            original: Arc::new(original),
            lexicon: Arc::new(lexicon),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Load both input files
    pub fn open(vectors: impl AsRef<Path>, lexicon: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(read_word_vectors(vectors)?, read_lexicon(lexicon)?))
    }

    /// Replace the word vectors with a freshly loaded file
    ///
    /// Discards any previous retrofitting result.
    pub fn load_vectors(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        self.ensure_idle()?;
        let space = read_word_vectors(path)?;
        Ok(self.replace_vectors(space))
    }

    /// Replace the lexicon with a freshly loaded file
    ///
    /// Discards any previous retrofitting result.
    pub fn load_lexicon(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        self.ensure_idle()?;
        let lexicon = read_lexicon(path)?;
        Ok(self.replace_lexicon(lexicon))
    }

    fn replace_vectors(&mut self, space: VectorSpace) -> usize {
        let len = space.len();
        self.original = Arc::new(space);
        self.discard_result();
        len
    }

    fn replace_lexicon(&mut self, lexicon: Lexicon) -> usize {
        let len = lexicon.len();
        self.lexicon = Arc::new(lexicon);
        self.discard_result();
        len
    }

    fn discard_result(&self) {
        if self.shared.latest.write().take().is_some() {
            info!("Inputs replaced; previous retrofitting result discarded");
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_running() {
            return Err(RetrofitError::RunInProgress);
        }
        Ok(())
    }

    pub fn original(&self) -> Arc<VectorSpace> {
        Arc::clone(&self.original)
    }

    pub fn lexicon(&self) -> Arc<Lexicon> {
        Arc::clone(&self.lexicon)
    }

    /// Vectors from the last successful run
    pub fn retrofitted(&self) -> Option<Arc<VectorSpace>> {
        self.shared.latest.read().as_ref().map(|l| Arc::clone(&l.run.vectors))
    }

    /// Diagnostics from the last successful run
    pub fn report(&self) -> Option<RetrofitReport> {
        self.shared.latest.read().as_ref().map(|l| l.run.report.clone())
    }

    /// Pre/post edge similarities from the last successful run
    pub fn comparison(&self) -> Option<Arc<SimilarityComparison>> {
        self.shared.latest.read().as_ref().map(|l| Arc::clone(&l.comparison))
    }

    /// Whether the word has an original or a retrofitted vector
    pub fn contains_word(&self, word: &str) -> bool {
        self.original.contains(word) || self.retrofitted().is_some_and(|r| r.contains(word))
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.shared.metrics
    }

    /// Start a retrofitting run in the background
    ///
    /// Fails with [`RetrofitError::RunInProgress`] while another run is
    /// active. On success the result replaces the previous one before
    /// [`RetrofitTask::join`] returns.
    pub fn start_retrofit(&self, config: RetrofitConfig) -> Result<RetrofitTask> {
        config.validate()?;
        let guard = RunGuard::claim(&self.shared)?;

        let original = Arc::clone(&self.original);
        let lexicon = Arc::clone(&self.lexicon);
        let comparison = SimilarityComparison::before(&original, &lexicon);

        info!(
            words = original.len(),
            lexicon = lexicon.len(),
            edges = comparison.len(),
            iterations = config.iterations,
            "Retrofitting run started"
        );

        Ok(self.launch(guard, retrofit_job(original, lexicon, config), comparison))
    }

    /// Spawn `job` and publish its result when it succeeds
    fn launch<J>(&self, guard: RunGuard, job: J, mut comparison: SimilarityComparison) -> RetrofitTask
    where
        J: FnOnce(&mut dyn FnMut(usize, usize), &dyn Fn() -> bool) -> Result<CompletedRun> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let started = Instant::now();

        RetrofitTask::spawn_job(job, move |result| {
            let _guard = guard;
            match result {
                Ok(run) => {
                    comparison.record_after(&run.vectors);
                    *shared.latest.write() = Some(LatestRun {
                        run: run.clone(),
                        comparison: Arc::new(comparison),
                    });
                    shared
                        .metrics
                        .record("retrofit", OperationStatus::Completed, started.elapsed());
                    info!(elapsed = ?started.elapsed(), "Retrofitting run completed");
                }
                Err(RetrofitError::Cancelled) => {
                    shared
                        .metrics
                        .record("retrofit", OperationStatus::Cancelled, started.elapsed());
                    warn!("Retrofitting run cancelled; previous result kept");
                }
                Err(e) => {
                    shared
                        .metrics
                        .record("retrofit", OperationStatus::Failed, started.elapsed());
                    error!(error = %e, "Retrofitting run failed; previous result kept");
                }
            }
        })
    }

    /// Filter words of the last result against `threshold` on a worker thread
    ///
    /// Works on immutable snapshots, so it may overlap with a run that is
    /// still computing its own copy.
    pub async fn filter(&self, threshold: f64) -> Result<FilterOutcome> {
        let retrofitted = self.retrofitted().ok_or(RetrofitError::NotRetrofitted)?;
        let original = Arc::clone(&self.original);
        let started = Instant::now();

        let result = tokio::task::spawn_blocking(move || filter(&original, &retrofitted, threshold))
            .await
            .unwrap_or_else(|e| Err(RetrofitError::ComputationFailed(e.to_string())));

        let status = if result.is_ok() {
            OperationStatus::Completed
        } else {
            OperationStatus::Failed
        };
        self.shared.metrics.record("filter", status, started.elapsed());
        result
    }

    /// Write the last result as text
    pub fn export(&self, path: impl AsRef<Path>) -> Result<usize> {
        let retrofitted = self.retrofitted().ok_or(RetrofitError::NotRetrofitted)?;
        write_word_vectors(&retrofitted, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        let space =
            VectorSpace::from_entries([("dog", vec![1.0, 0.0]), ("cat", vec![0.0, 1.0])]).unwrap();
        let lexicon = Lexicon::from_entries([("dog", vec!["cat"])]);
        Workspace::new(space, lexicon)
    }

    #[tokio::test]
    async fn test_run_swaps_in_result() {
        let ws = workspace();
        assert!(ws.retrofitted().is_none());

        let task = ws.start_retrofit(RetrofitConfig::new(1, 1.0, 1.0)).unwrap();
        let run = task.join().await.unwrap();

        let stored = ws.retrofitted().unwrap();
        assert!(Arc::ptr_eq(&stored, &run.vectors));
        assert_eq!(stored.get("dog"), Some(&[0.5, 0.5][..]));
        assert_eq!(ws.original().get("dog"), Some(&[1.0, 0.0][..]));
        assert!(!ws.is_running());
        assert_eq!(ws.metrics().ops_by_name().get("retrofit"), Some(&1));
    }

    #[tokio::test]
    async fn test_single_run_at_a_time() {
        let ws = workspace();
        let task = ws.start_retrofit(RetrofitConfig::new(1_000_000, 1.0, 1.0)).unwrap();

        assert!(matches!(
            ws.start_retrofit(RetrofitConfig::default()),
            Err(RetrofitError::RunInProgress)
        ));

        task.cancel();
        assert!(matches!(task.join().await, Err(RetrofitError::Cancelled)));
        assert!(!ws.is_running());
        assert!(ws.retrofitted().is_none());
        assert_eq!(ws.metrics().cancelled(), 1);

        // Slot is free again
        let task = ws.start_retrofit(RetrofitConfig::new(1, 1.0, 1.0)).unwrap();
        assert!(task.join().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_run_keeps_previous_result() {
        let ws = workspace();
        ws.start_retrofit(RetrofitConfig::new(1, 1.0, 1.0))
            .unwrap()
            .join()
            .await
            .unwrap();
        let previous = ws.retrofitted().unwrap();
        let previous_comparison = ws.comparison().unwrap();

        let guard = RunGuard::claim(&ws.shared).unwrap();
        let comparison = SimilarityComparison::before(&ws.original, &ws.lexicon);
        let task = ws.launch(
            guard,
            |on_iteration, _| {
                on_iteration(1, 10);
                panic!("non-finite update");
            },
            comparison,
        );

        assert!(matches!(
            task.join().await,
            Err(RetrofitError::ComputationFailed(m)) if m == "non-finite update"
        ));
        assert!(!ws.is_running());
        assert!(Arc::ptr_eq(&ws.retrofitted().unwrap(), &previous));
        assert!(Arc::ptr_eq(&ws.comparison().unwrap(), &previous_comparison));
        assert_eq!(ws.metrics().failed(), 1);
        assert_eq!(ws.metrics().completed(), 1);
    }

    #[tokio::test]
    async fn test_filter_requires_result() {
        let ws = workspace();
        assert!(matches!(ws.filter(0.5).await, Err(RetrofitError::NotRetrofitted)));
    }

    #[tokio::test]
    async fn test_filter_after_run() {
        let ws = workspace();
        ws.start_retrofit(RetrofitConfig::new(1, 1.0, 1.0))
            .unwrap()
            .join()
            .await
            .unwrap();

        let outcome = ws.filter(0.9).await.unwrap();
        let matches = outcome.matches().unwrap();
        // dog moved to 45 degrees, cat untouched
        assert_eq!(matches.words().collect::<Vec<_>>(), vec!["cat"]);
        assert_eq!(matches.examined, 2);

        let none = ws.filter(1.1).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_comparison_available_after_run() {
        let ws = workspace();
        assert!(ws.comparison().is_none());
        ws.start_retrofit(RetrofitConfig::new(2, 1.0, 1.0))
            .unwrap()
            .join()
            .await
            .unwrap();

        let comparison = ws.comparison().unwrap();
        assert_eq!(comparison.len(), 1);
        assert!(comparison.pairs()[0].difference().unwrap() > 0.0);
        assert_eq!(ws.report().unwrap().completed_iterations(), 2);
    }

    #[tokio::test]
    async fn test_export_and_reload_discards_result() {
        let dir = tempfile::tempdir().unwrap();
        let vectors = dir.path().join("vectors.txt");
        let lexicon = dir.path().join("lexicon.txt");
        std::fs::write(&vectors, "dog 1 0\ncat 0 1\n").unwrap();
        std::fs::write(&lexicon, "dog cat\n").unwrap();

        let mut ws = Workspace::open(&vectors, &lexicon).unwrap();
        assert!(matches!(
            ws.export(dir.path().join("none.txt")),
            Err(RetrofitError::NotRetrofitted)
        ));

        ws.start_retrofit(RetrofitConfig::new(1, 1.0, 1.0))
            .unwrap()
            .join()
            .await
            .unwrap();

        let out = dir.path().join("out.txt");
        assert_eq!(ws.export(&out).unwrap(), 2);
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("dog 0.5000 0.5000"));

        assert_eq!(ws.load_lexicon(&lexicon).unwrap(), 1);
        assert!(ws.retrofitted().is_none());
        assert!(ws.contains_word("cat"));
    }

    #[tokio::test]
    async fn test_open_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = Workspace::open(dir.path().join("v.txt"), dir.path().join("l.txt"));
        assert!(matches!(result, Err(RetrofitError::InputMissing(_))));
    }
}
