//! Thread-safe per-cell result aggregation.
//!
//! The matrix is the single shared mutable resource of a batch run. Every
//! worker performs one set-once terminal write per cell plus one shared
//! counter increment; renderers read immutable snapshots and never hold the
//! workers' lock across drawing.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Output of a succeeded cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellOutput {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Lifecycle of one grid cell. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellState {
    Pending,
    Running,
    Succeeded(CellOutput),
    Failed(String),
}

impl CellState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, CellState::Succeeded(_) | CellState::Failed(_))
    }
}

/// Sparse 2-D store of cell states for one batch run.
///
/// All operations are safe under concurrent access from the worker pool; no
/// external locking is required by callers.
#[derive(Debug)]
pub struct ResultMatrix {
    rows: usize,
    cols: usize,
    cells: Mutex<HashMap<(usize, usize), CellState>>,
    completed: AtomicUsize,
}

impl ResultMatrix {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: Mutex::new(HashMap::new()),
            completed: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.rows * self.cols
    }

    fn check_bounds(&self, row: usize, col: usize) {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} matrix",
            self.rows,
            self.cols
        );
    }

    /// Marks a cell as running. Informational only and idempotent; a cell that
    /// already holds a terminal result is left untouched.
    pub fn mark_running(&self, row: usize, col: usize) {
        self.check_bounds(row, col);
        let mut cells = self.cells.lock().unwrap();
        let state = cells.entry((row, col)).or_insert(CellState::Pending);
        if !state.is_terminal() {
            *state = CellState::Running;
        }
    }

    /// Records the terminal result for a cell, exactly once.
    ///
    /// # Panics
    ///
    /// Panics if `result` is not terminal or if the cell already has a
    /// terminal result. The scheduler is the single producer per cell, so a
    /// second write is a programming error, not a runtime condition.
    pub fn set_result(&self, row: usize, col: usize, result: CellState) {
        self.check_bounds(row, col);
        assert!(
            result.is_terminal(),
            "set_result called with non-terminal state for cell ({row}, {col})"
        );
        let mut cells = self.cells.lock().unwrap();
        let previous = cells.insert((row, col), result);
        assert!(
            !previous.as_ref().is_some_and(CellState::is_terminal),
            "result for cell ({row}, {col}) set twice"
        );
        drop(cells);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of cells holding a terminal result.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Whether every cell has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_count() == self.total_cells()
    }

    /// Number of cells that succeeded so far.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.cells
            .lock()
            .unwrap()
            .values()
            .filter(|s| matches!(s, CellState::Succeeded(_)))
            .count()
    }

    /// Current state of one cell. Absent cells read as `Pending`.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> CellState {
        self.check_bounds(row, col);
        self.cells
            .lock()
            .unwrap()
            .get(&(row, col))
            .cloned()
            .unwrap_or(CellState::Pending)
    }

    /// Immutable row-major snapshot of the whole grid for rendering.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Vec<CellState>> {
        let cells = self.cells.lock().unwrap();
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| {
                        cells
                            .get(&(row, col))
                            .cloned()
                            .unwrap_or(CellState::Pending)
                    })
                    .collect()
            })
            .collect()
    }
}
