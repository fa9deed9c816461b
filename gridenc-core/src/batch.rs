//! Caller-facing batch lifecycle: start, observe, cancel, join.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::axis::{quality_axis, resolution_axis};
use crate::config::BatchConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{Encoder, FileMetadataProvider, StdFsMetadataProvider};
use crate::grid::build_grid;
use crate::matrix::ResultMatrix;
use crate::resolution::Resolution;
use crate::scheduler::{BatchScheduler, BatchSummary};
use crate::source::SourceInfo;

/// Lifecycle of one batch run. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    NotStarted,
    Running,
    Completed,
    Cancelled,
}

impl BatchState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchState::Completed | BatchState::Cancelled)
    }
}

/// Moves the state machine forward; terminal states are never left.
fn transition(state: &Mutex<BatchState>, next: BatchState) {
    let mut guard = state.lock().unwrap();
    if !guard.is_terminal() {
        log::debug!("Batch state: {:?} -> {next:?}", *guard);
        *guard = next;
    }
}

type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Fan-out of progress updates to any number of subscribers.
#[derive(Default)]
struct ProgressSubscribers {
    callbacks: Mutex<Vec<ProgressCallback>>,
}

impl ProgressSubscribers {
    fn add(&self, callback: ProgressCallback) {
        self.callbacks.lock().unwrap().push(callback);
    }

    fn notify(&self, completed: usize, total: usize) {
        for callback in self.callbacks.lock().unwrap().iter() {
            callback(completed, total);
        }
    }
}

/// Public entry point: builds the grid for a [`BatchConfig`] and drives it on
/// a background thread through [`BatchScheduler`].
pub struct BatchController {
    encoder: Arc<dyn Encoder + Send + Sync>,
    metadata: Arc<dyn FileMetadataProvider + Send + Sync>,
}

impl BatchController {
    pub fn new(encoder: Arc<dyn Encoder + Send + Sync>) -> Self {
        Self {
            encoder,
            metadata: Arc::new(StdFsMetadataProvider),
        }
    }

    /// Overrides the output-size lookup, mainly for tests.
    #[must_use]
    pub fn metadata_provider(
        mut self,
        provider: Arc<dyn FileMetadataProvider + Send + Sync>,
    ) -> Self {
        self.metadata = provider;
        self
    }

    /// Starts a batch run.
    ///
    /// Axis and configuration errors surface here, synchronously, before any
    /// task runs. On success the scheduler thread is already working; use the
    /// returned handle to observe, cancel, or join the run.
    pub fn start(&self, source: SourceInfo, config: BatchConfig) -> CoreResult<BatchHandle> {
        config.validate()?;
        let resolutions = resolution_axis(&config.resolution_axis)?;
        let crf_values = quality_axis(&config.quality_axis)?;
        let tasks = build_grid(
            &resolutions,
            &crf_values,
            config.frame_rate,
            config.keep_audio,
        );
        let total_tasks = tasks.len();

        let matrix = Arc::new(ResultMatrix::new(crf_values.len(), resolutions.len()));
        let state = Arc::new(Mutex::new(BatchState::NotStarted));
        let cancel = Arc::new(AtomicBool::new(false));
        let subscribers = Arc::new(ProgressSubscribers::default());

        let scheduler = {
            let subscribers = Arc::clone(&subscribers);
            BatchScheduler::new(Arc::clone(&self.encoder))
                .metadata_provider(Arc::clone(&self.metadata))
                .max_threads(config.max_threads)
                .on_progress(move |completed, total| subscribers.notify(completed, total))
        };

        let worker = {
            let matrix = Arc::clone(&matrix);
            let state = Arc::clone(&state);
            let cancel = Arc::clone(&cancel);
            std::thread::Builder::new()
                .name("gridenc-batch".to_string())
                .spawn(move || {
                    transition(&state, BatchState::Running);
                    let result = scheduler.run(&source, &config, &tasks, &matrix, &cancel);
                    let terminal = if cancel.load(Ordering::SeqCst) {
                        BatchState::Cancelled
                    } else {
                        BatchState::Completed
                    };
                    transition(&state, terminal);
                    result
                })?
        };

        Ok(BatchHandle {
            matrix,
            state,
            cancel,
            subscribers,
            total_tasks,
            resolutions,
            crf_values,
            worker: Mutex::new(Some(worker)),
        })
    }
}

/// Handle to a running (or finished) batch.
pub struct BatchHandle {
    matrix: Arc<ResultMatrix>,
    state: Arc<Mutex<BatchState>>,
    cancel: Arc<AtomicBool>,
    subscribers: Arc<ProgressSubscribers>,
    total_tasks: usize,
    resolutions: Vec<Resolution>,
    crf_values: Vec<u8>,
    worker: Mutex<Option<JoinHandle<CoreResult<BatchSummary>>>>,
}

impl BatchHandle {
    /// Requests cancellation. Not-yet-started tasks are skipped; in-flight
    /// encodes are not interrupted and their results stay recorded.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if *state == BatchState::Running {
            log::info!("Batch cancellation requested");
            *state = BatchState::Cancelled;
        }
    }

    #[must_use]
    pub fn state(&self) -> BatchState {
        *self.state.lock().unwrap()
    }

    /// Shared view of the live result matrix for pull-based rendering.
    #[must_use]
    pub fn matrix(&self) -> Arc<ResultMatrix> {
        Arc::clone(&self.matrix)
    }

    #[must_use]
    pub fn total_tasks(&self) -> usize {
        self.total_tasks
    }

    /// Column headers: the generated resolution axis.
    #[must_use]
    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    /// Row headers: the generated quality axis.
    #[must_use]
    pub fn crf_values(&self) -> &[u8] {
        &self.crf_values
    }

    /// Registers a progress callback invoked with `(completed, total)` each
    /// time a cell finishes. Callbacks run on worker threads.
    pub fn subscribe_progress<F>(&self, callback: F)
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.subscribers.add(Box::new(callback));
    }

    /// Blocks until the batch reaches a terminal state and returns the
    /// summary. May be called once; later calls fail.
    pub fn await_summary(&self) -> CoreResult<BatchSummary> {
        let worker = self
            .worker
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| CoreError::OperationFailed("batch already joined".to_string()))?;
        worker
            .join()
            .map_err(|_| CoreError::OperationFailed("batch worker thread panicked".to_string()))?
    }
}
