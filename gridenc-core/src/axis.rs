//! Axis interpolation for the parameter sweep.
//!
//! Both axes sample an inclusive range at `steps` points with round-half-up
//! index arithmetic. The resolution axis ascends from `min` to `max`; the
//! quality axis descends from `max` to `min` so the best-quality row comes
//! first. Duplicate values are kept when the requested step count is finer
//! than the underlying domain.

use crate::config::AxisSpec;
use crate::error::{CoreError, CoreResult};
use crate::resolution::Resolution;

/// Rounding used for axis interpolation: half-up, like `Math.round`.
fn round_half_up(x: f64) -> usize {
    (x + 0.5).floor() as usize
}

fn check_steps(steps: usize) -> CoreResult<()> {
    if steps == 0 {
        return Err(CoreError::InvalidAxis(
            "steps must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Generates the resolution axis, ascending over the canonical ladder.
///
/// A single step yields `[max]`; otherwise `steps` ladder entries are taken at
/// evenly interpolated ladder indices between `min` and `max` inclusive.
pub fn resolution_axis(spec: &AxisSpec<Resolution>) -> CoreResult<Vec<Resolution>> {
    check_steps(spec.steps)?;
    if spec.min > spec.max {
        return Err(CoreError::InvalidAxis(format!(
            "resolution min {} is above max {}",
            spec.min.label(),
            spec.max.label()
        )));
    }
    if spec.steps == 1 {
        return Ok(vec![spec.max]);
    }

    let ladder = Resolution::ladder();
    let min_index = spec.min.ladder_index();
    let span = (spec.max.ladder_index() - min_index) as f64;
    let divisions = (spec.steps - 1) as f64;

    Ok((0..spec.steps)
        .map(|i| ladder[min_index + round_half_up(i as f64 * span / divisions)])
        .collect())
}

/// Generates the quality (CRF) axis, descending from `max` to `min`.
pub fn quality_axis(spec: &AxisSpec<u8>) -> CoreResult<Vec<u8>> {
    check_steps(spec.steps)?;
    if spec.min > spec.max {
        return Err(CoreError::InvalidAxis(format!(
            "quality min {} is above max {}",
            spec.min, spec.max
        )));
    }
    if spec.steps == 1 {
        return Ok(vec![spec.max]);
    }

    let span = f64::from(spec.max - spec.min);
    let divisions = (spec.steps - 1) as f64;

    Ok((0..spec.steps)
        .map(|i| spec.max - round_half_up(i as f64 * span / divisions) as u8)
        .collect())
}
