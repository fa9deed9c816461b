//! Error types shared across the gridenc core library.
//!
//! Per-cell encode failures are deliberately *not* represented here: the
//! scheduler absorbs them into the result matrix as `CellState::Failed` so a
//! single bad cell can never abort a batch. `CoreError` covers everything that
//! is fatal to constructing or driving a batch as a whole.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors surfaced synchronously to the caller, before or outside task execution.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed axis specification (`steps == 0` or `min > max`).
    #[error("Invalid axis: {0}")]
    InvalidAxis(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No video stream found in {0}")]
    NoVideoStream(String),

    #[error("Failed to parse ffprobe output: {0}")]
    FfprobeParse(String),

    #[error("External dependency '{0}' not found in PATH")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("{0} failed with status {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Invalid path: {0}")]
    PathError(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type used throughout the core library.
pub type CoreResult<T> = Result<T, CoreError>;

pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}
