//! Grid construction: the cartesian product of both axes.

use crate::config::EncodeConfig;
use crate::resolution::Resolution;

/// One grid cell: immutable once created. Row and column indices are fixed at
/// build time and stay stable regardless of completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Index into the quality axis.
    pub row: usize,
    /// Index into the resolution axis.
    pub col: usize,
    pub config: EncodeConfig,
}

/// Builds the full task list, row-major: row = quality index, column =
/// resolution index. Deterministic and order-stable for identical inputs.
#[must_use]
pub fn build_grid(
    resolutions: &[Resolution],
    crf_values: &[u8],
    frame_rate: u32,
    keep_audio: bool,
) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(resolutions.len() * crf_values.len());
    for (row, &crf) in crf_values.iter().enumerate() {
        for (col, &resolution) in resolutions.iter().enumerate() {
            tasks.push(Task {
                row,
                col,
                config: EncodeConfig {
                    resolution,
                    fps: frame_rate,
                    crf,
                    keep_audio,
                },
            });
        }
    }
    tasks
}
