//! Bounding shapes for region-constrained models.
//!
//! A [`BoundingBox`] frames the two-axis area a grid, raster, spiral or
//! Lissajous model covers; a [`BoundingLine`] frames the segment a 1-D line
//! model runs along. Both are plain data and serialise with the wire field
//! names of the acquisition protocol (`fastAxisStart`, `xStart`, ...).

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in scan coordinates.
///
/// Lengths may be negative: the scan then runs in the negative direction of
/// that axis. [`BoundingBox::union`] normalises internally, so folds over
/// mixed-direction boxes stay correct.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Fast-axis coordinate of the box origin.
    pub fast_axis_start: f64,
    /// Slow-axis coordinate of the box origin.
    pub slow_axis_start: f64,
    /// Signed extent along the fast axis.
    pub fast_axis_length: f64,
    /// Signed extent along the slow axis.
    pub slow_axis_length: f64,
}

impl BoundingBox {
    /// Builds a box from origin and signed lengths.
    pub fn new(
        fast_axis_start: f64,
        slow_axis_start: f64,
        fast_axis_length: f64,
        slow_axis_length: f64,
    ) -> Self {
        Self {
            fast_axis_start,
            slow_axis_start,
            fast_axis_length,
            slow_axis_length,
        }
    }

    /// Fast-axis coordinate of the far edge.
    pub fn fast_axis_end(&self) -> f64 {
        self.fast_axis_start + self.fast_axis_length
    }

    /// Slow-axis coordinate of the far edge.
    pub fn slow_axis_end(&self) -> f64 {
        self.slow_axis_start + self.slow_axis_length
    }

    /// Centre of the box.
    pub fn centre(&self) -> (f64, f64) {
        (
            self.fast_axis_start + self.fast_axis_length / 2.0,
            self.slow_axis_start + self.slow_axis_length / 2.0,
        )
    }

    /// Smallest box containing both `self` and `other`.
    ///
    /// The result always has non-negative lengths; deriving a box from regions
    /// of interest never shrinks an existing box, it only grows it.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let (a_f0, a_f1) = ordered(self.fast_axis_start, self.fast_axis_end());
        let (a_s0, a_s1) = ordered(self.slow_axis_start, self.slow_axis_end());
        let (b_f0, b_f1) = ordered(other.fast_axis_start, other.fast_axis_end());
        let (b_s0, b_s1) = ordered(other.slow_axis_start, other.slow_axis_end());

        let f0 = a_f0.min(b_f0);
        let f1 = a_f1.max(b_f1);
        let s0 = a_s0.min(b_s0);
        let s1 = a_s1.max(b_s1);
        BoundingBox::new(f0, s0, f1 - f0, s1 - s0)
    }

    /// True when `(fast, slow)` lies inside or on the edge of the box.
    pub fn contains(&self, fast: f64, slow: f64) -> bool {
        let (f0, f1) = ordered(self.fast_axis_start, self.fast_axis_end());
        let (s0, s1) = ordered(self.slow_axis_start, self.slow_axis_end());
        fast >= f0 && fast <= f1 && slow >= s0 && slow <= s1
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Line segment in scan coordinates: origin, length and angle in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingLine {
    /// X coordinate of the segment origin.
    pub x_start: f64,
    /// Y coordinate of the segment origin.
    pub y_start: f64,
    /// Segment length.
    pub length: f64,
    /// Direction, anticlockwise from the positive x axis, radians.
    pub angle: f64,
}

impl BoundingLine {
    /// Builds a line from origin, length and angle.
    pub fn new(x_start: f64, y_start: f64, length: f64, angle: f64) -> Self {
        Self {
            x_start,
            y_start,
            length,
            angle,
        }
    }

    /// Unit direction vector `(cos angle, sin angle)`.
    pub fn direction(&self) -> (f64, f64) {
        (self.angle.cos(), self.angle.sin())
    }

    /// The far endpoint of the segment.
    pub fn end_point(&self) -> (f64, f64) {
        let (dx, dy) = self.direction();
        (self.x_start + self.length * dx, self.y_start + self.length * dy)
    }
}
