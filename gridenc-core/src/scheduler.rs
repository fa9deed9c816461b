//! Bounded-concurrency execution of the task grid.
//!
//! Every task is independent: one blocking encoder invocation, one terminal
//! write into the matrix. A task's failure never propagates to its siblings,
//! and cancellation only keeps not-yet-started tasks out of the pool.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::{output_path, BatchConfig};
use crate::error::{CoreError, CoreResult};
use crate::external::{Encoder, FileMetadataProvider, StdFsMetadataProvider};
use crate::grid::Task;
use crate::matrix::{CellOutput, CellState, ResultMatrix};
use crate::source::SourceInfo;

/// End-of-batch summary handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub success_count: usize,
    pub total_tasks: usize,
}

/// Runs grid tasks on a fixed-size worker pool and aggregates results into a
/// shared [`ResultMatrix`].
pub struct BatchScheduler {
    encoder: Arc<dyn Encoder + Send + Sync>,
    metadata: Arc<dyn FileMetadataProvider + Send + Sync>,
    max_threads: usize,
    on_progress: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
}

impl BatchScheduler {
    pub fn new(encoder: Arc<dyn Encoder + Send + Sync>) -> Self {
        Self {
            encoder,
            metadata: Arc::new(StdFsMetadataProvider),
            max_threads: num_cpus::get(),
            on_progress: None,
        }
    }

    /// Sets the worker pool size. No upper bound is enforced; values above
    /// the available parallelism oversubscribe the pool.
    #[must_use]
    pub fn max_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads.max(1);
        self
    }

    /// Replaces the output-size lookup, mainly for tests.
    #[must_use]
    pub fn metadata_provider(mut self, provider: Arc<dyn FileMetadataProvider + Send + Sync>) -> Self {
        self.metadata = provider;
        self
    }

    /// Registers a callback invoked with `(completed, total)` after every
    /// cell finishes, from whichever worker finished it.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Executes every task at most once with at most `max_threads` in flight.
    ///
    /// Tasks failing validation are recorded as `Failed` up front without
    /// consuming a worker slot. Returns once every dispatched task has a
    /// result; tasks skipped by cancellation stay `Pending`.
    pub fn run(
        &self,
        source: &SourceInfo,
        config: &BatchConfig,
        tasks: &[Task],
        matrix: &ResultMatrix,
        cancel: &AtomicBool,
    ) -> CoreResult<BatchSummary> {
        let total = tasks.len();
        std::fs::create_dir_all(&config.output_dir)?;

        let mut valid_tasks: Vec<&Task> = Vec::with_capacity(total);
        for task in tasks {
            match task.config.validate(source) {
                Ok(()) => valid_tasks.push(task),
                Err(msg) => {
                    log::info!(
                        "Skipping cell ({}, {}): {msg}",
                        task.row,
                        task.col
                    );
                    self.record(matrix, task, CellState::Failed(msg));
                }
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_threads)
            .build()
            .map_err(|e| {
                CoreError::OperationFailed(format!("Failed to build worker pool: {e}"))
            })?;
        log::info!(
            "Dispatching {} of {total} tasks on {} worker threads",
            valid_tasks.len(),
            self.max_threads
        );

        pool.install(|| {
            valid_tasks.par_iter().for_each(|task| {
                if cancel.load(Ordering::SeqCst) {
                    log::debug!("Cancelled before start: cell ({}, {})", task.row, task.col);
                    return;
                }
                matrix.mark_running(task.row, task.col);
                let result = self.run_task(source, task, &config.output_dir);
                self.record(matrix, task, result);
            });
        });

        let summary = BatchSummary {
            success_count: matrix.success_count(),
            total_tasks: total,
        };
        log::info!(
            "Batch finished: {}/{} cells succeeded",
            summary.success_count,
            summary.total_tasks
        );
        Ok(summary)
    }

    /// Runs one cell to its terminal state. Every failure is absorbed into
    /// the returned state; nothing escapes the worker boundary.
    fn run_task(&self, source: &SourceInfo, task: &Task, output_dir: &Path) -> CellState {
        let output = output_path(source, &task.config, output_dir);
        log::debug!(
            "Encoding cell ({}, {}) -> {}",
            task.row,
            task.col,
            output.display()
        );

        if let Err(err) = self.encoder.encode(source, &task.config, &output) {
            return CellState::Failed(err.to_string());
        }

        // The encoder reporting success does not guarantee a readable output
        // file; that inconsistency is its own failure mode.
        match self.metadata.get_size(&output) {
            Ok(size_bytes) => CellState::Succeeded(CellOutput {
                path: output,
                size_bytes,
            }),
            Err(err) => CellState::Failed(format!(
                "Encode succeeded but output file size could not be read: {err}"
            )),
        }
    }

    fn record(&self, matrix: &ResultMatrix, task: &Task, result: CellState) {
        matrix.set_result(task.row, task.col, result);
        if let Some(callback) = &self.on_progress {
            callback(matrix.completed_count(), matrix.total_cells());
        }
    }
}
