//! Kernels for the straight-line pair.

use crate::error::ScanResult;
use crate::models::{OneDEqualSpacingModel, OneDStepModel};

use super::{require_line, stepped_count, PathKernel, RawPoint};

#[derive(Debug, Clone, Copy)]
struct LineGeometry {
    x_start: f64,
    y_start: f64,
    dir_x: f64,
    dir_y: f64,
}

impl LineGeometry {
    fn new(x_start: f64, y_start: f64, angle: f64) -> Self {
        Self {
            x_start,
            y_start,
            dir_x: angle.cos(),
            dir_y: angle.sin(),
        }
    }

    /// The (slow, fast) values at distance `t` along the line. The fast axis
    /// carries x, the slow axis y.
    fn at(&self, t: f64) -> (f64, f64) {
        (
            self.y_start + t * self.dir_y,
            self.x_start + t * self.dir_x,
        )
    }
}

/// `points` positions at the centres of equal shares of the line, so the
/// first sits half a share in from the origin and neither endpoint is
/// visited.
pub(crate) struct EqualSpacingLineKernel {
    geometry: LineGeometry,
    share: f64,
    points: u64,
}

impl EqualSpacingLineKernel {
    pub(crate) fn new(model: &OneDEqualSpacingModel) -> ScanResult<Self> {
        let line = require_line("one_d_equal_spacing", model.bounding_line.as_ref())?;
        Ok(Self {
            geometry: LineGeometry::new(line.x_start, line.y_start, line.angle),
            share: line.length / model.points as f64,
            points: model.points,
        })
    }
}

impl PathKernel for EqualSpacingLineKernel {
    fn count(&self) -> u64 {
        self.points
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.points);
        let (slow, fast) = self.geometry.at((index as f64 + 0.5) * self.share);
        RawPoint::new(vec![slow, fast], vec![index as i64, index as i64])
    }
}

/// Positions on whole multiples of `step` from the line origin, origin
/// included, out to the end of the line.
pub(crate) struct SteppedLineKernel {
    geometry: LineGeometry,
    step: f64,
    count: u64,
}

impl SteppedLineKernel {
    pub(crate) fn new(model: &OneDStepModel) -> ScanResult<Self> {
        let line = require_line("one_d_step", model.bounding_line.as_ref())?;
        Ok(Self {
            geometry: LineGeometry::new(line.x_start, line.y_start, line.angle),
            step: model.step,
            count: stepped_count(0.0, line.length, model.step),
        })
    }
}

impl PathKernel for SteppedLineKernel {
    fn count(&self) -> u64 {
        self.count
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.count);
        let (slow, fast) = self.geometry.at(index as f64 * self.step);
        RawPoint::new(vec![slow, fast], vec![index as i64, index as i64])
    }
}
