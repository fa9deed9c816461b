//! Core library for parameter-grid encode sweeps using ffmpeg and ffprobe.
//!
//! gridenc sweeps a cartesian grid of encoding parameters (resolution ladder ×
//! CRF quality) against one source video, runs every cell as an independent
//! encode on a bounded worker pool, and aggregates per-cell results into a
//! thread-safe matrix. One cell's failure never aborts the rest of the batch.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use gridenc_core::{
//!     probe, AxisSpec, BatchConfig, BatchController, Resolution, SidecarEncoder,
//! };
//!
//! let source = probe(&PathBuf::from("/videos/sample.mp4")).unwrap();
//!
//! let mut config = BatchConfig::new(PathBuf::from("/videos/out"));
//! config.resolution_axis = AxisSpec::new(Resolution::R480p, Resolution::R1080p, 3);
//! config.quality_axis = AxisSpec::new(20, 35, 4);
//! config.max_threads = 2;
//!
//! let controller = BatchController::new(Arc::new(SidecarEncoder::new()));
//! let handle = controller.start(source, config).unwrap();
//! handle.subscribe_progress(|completed, total| eprintln!("{completed}/{total}"));
//! let summary = handle.await_summary().unwrap();
//! println!("{}/{} cells succeeded", summary.success_count, summary.total_tasks);
//! ```

pub mod axis;
pub mod batch;
pub mod config;
pub mod error;
pub mod external;
pub mod grid;
pub mod matrix;
pub mod resolution;
pub mod scheduler;
pub mod source;
pub mod utils;

// Re-exports for public API
pub use batch::{BatchController, BatchHandle, BatchState};
pub use config::{output_path, AxisSpec, BatchConfig, EncodeConfig, DEFAULT_CRF, DEFAULT_FRAME_RATE};
pub use error::{CoreError, CoreResult};
pub use external::{check_dependency, probe, Encoder, FileMetadataProvider, SidecarEncoder, StdFsMetadataProvider};
pub use grid::{build_grid, Task};
pub use matrix::{CellOutput, CellState, ResultMatrix};
pub use resolution::Resolution;
pub use scheduler::{BatchScheduler, BatchSummary};
pub use source::{AudioStreamInfo, SourceInfo, VideoStreamInfo};
pub use utils::{format_bytes, format_duration};
