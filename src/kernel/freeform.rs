//! Kernels for the free-form figures.

use std::f64::consts::PI;

use crate::error::ScanResult;
use crate::models::{LissajousModel, SpiralModel};

use super::{require_box, PathKernel, RawPoint};

/// Archimedean spiral from the box centre out to the circumscribing circle.
///
/// Point `i` sits at angle `phi = alpha * sqrt(i + 0.5)` with radius
/// `beta * phi`, `alpha = sqrt(4*pi)` and `beta = scale / 2*pi`. Equal
/// increments of `sqrt(i)` give roughly equal path lengths between points,
/// so the sampling density is uniform along the spiral.
pub(crate) struct SpiralKernel {
    centre_x: f64,
    centre_y: f64,
    alpha: f64,
    beta: f64,
    count: u64,
}

impl SpiralKernel {
    pub(crate) fn new(model: &SpiralModel) -> ScanResult<Self> {
        let bx = require_box("spiral", model.bounding_box.as_ref())?;
        let (centre_x, centre_y) = bx.centre();
        let alpha = (4.0 * PI).sqrt();
        let beta = model.scale / (2.0 * PI);
        let half_w = bx.fast_axis_length.abs() / 2.0;
        let half_h = bx.slow_axis_length.abs() / 2.0;
        let max_radius = (half_w * half_w + half_h * half_h).sqrt();

        // Keep every point whose radius stays inside the circumradius.
        let limit = (max_radius / (alpha * beta)).powi(2) - 0.5;
        let count = if limit < 0.0 {
            0
        } else {
            limit.floor() as u64 + 1
        };
        Ok(Self {
            centre_x,
            centre_y,
            alpha,
            beta,
            count,
        })
    }
}

impl PathKernel for SpiralKernel {
    fn count(&self) -> u64 {
        self.count
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.count);
        let phi = self.alpha * (index as f64 + 0.5).sqrt();
        let radius = self.beta * phi;
        let fast = self.centre_x + radius * phi.cos();
        let slow = self.centre_y + radius * phi.sin();
        RawPoint::new(vec![slow, fast], vec![index as i64, index as i64])
    }
}

/// Lissajous figure inscribed in the box, sampled at `points` equal
/// increments of the sweep parameter.
pub(crate) struct LissajousKernel {
    centre_x: f64,
    centre_y: f64,
    half_width: f64,
    half_height: f64,
    a: f64,
    b: f64,
    delta: f64,
    points: u64,
}

impl LissajousKernel {
    pub(crate) fn new(model: &LissajousModel) -> ScanResult<Self> {
        let bx = require_box("lissajous", model.bounding_box.as_ref())?;
        let (centre_x, centre_y) = bx.centre();
        Ok(Self {
            centre_x,
            centre_y,
            half_width: bx.fast_axis_length / 2.0,
            half_height: bx.slow_axis_length / 2.0,
            a: model.a,
            b: model.b,
            delta: model.delta,
            points: model.points,
        })
    }
}

impl PathKernel for LissajousKernel {
    fn count(&self) -> u64 {
        self.points
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.points);
        let theta = 2.0 * PI * index as f64 / self.points as f64;
        let fast = self.centre_x + self.half_width * (self.a * theta + self.delta).sin();
        let slow = self.centre_y + self.half_height * (self.b * theta).sin();
        RawPoint::new(vec![slow, fast], vec![index as i64, index as i64])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(-1.0, -1.0, 2.0, 2.0)
    }

    #[test]
    fn test_spiral_stays_inside_the_circumradius() {
        let model = SpiralModel::new("x", "y", 0.5, unit_box());
        let kernel = SpiralKernel::new(&model).unwrap();
        assert!(kernel.count() > 0);
        let max_radius = 2.0_f64.sqrt();
        for i in 0..kernel.count() {
            let point = kernel.produce(i);
            let (y, x) = (point.values[0], point.values[1]);
            let radius = (x * x + y * y).sqrt();
            assert!(radius <= max_radius + 1e-9, "point {i} at radius {radius}");
        }
    }

    #[test]
    fn test_spiral_radius_grows_monotonically() {
        let model = SpiralModel::new("x", "y", 0.5, unit_box());
        let kernel = SpiralKernel::new(&model).unwrap();
        let radius_at = |i: u64| {
            let p = kernel.produce(i);
            (p.values[0].powi(2) + p.values[1].powi(2)).sqrt()
        };
        for i in 1..kernel.count() {
            assert!(radius_at(i) > radius_at(i - 1));
        }
    }

    #[test]
    fn test_smaller_scale_gives_more_points() {
        let coarse = SpiralKernel::new(&SpiralModel::new("x", "y", 1.0, unit_box())).unwrap();
        let fine = SpiralKernel::new(&SpiralModel::new("x", "y", 0.1, unit_box())).unwrap();
        assert!(fine.count() > coarse.count());
    }

    #[test]
    fn test_degenerate_box_spiral_is_empty() {
        let model = SpiralModel::new("x", "y", 1.0, BoundingBox::new(0.0, 0.0, 0.0, 0.0));
        let kernel = SpiralKernel::new(&model).unwrap();
        assert_eq!(kernel.count(), 0);
    }

    #[test]
    fn test_lissajous_starts_at_phase_and_stays_inside_the_box() {
        let mut model = LissajousModel::new("x", "y", 3.0, 2.0, 200, unit_box());
        model.delta = 0.0;
        let kernel = LissajousKernel::new(&model).unwrap();
        assert_eq!(kernel.count(), 200);

        // theta = 0 with zero phase puts the first point on the box centre.
        let first = kernel.produce(0);
        assert!(first.values[0].abs() < 1e-12);
        assert!(first.values[1].abs() < 1e-12);

        for i in 0..kernel.count() {
            let point = kernel.produce(i);
            assert!(point.values[0].abs() <= 1.0 + 1e-12);
            assert!(point.values[1].abs() <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_lissajous_phase_shifts_the_fast_axis() {
        let mut model = LissajousModel::new("x", "y", 1.0, 1.0, 100, unit_box());
        model.delta = std::f64::consts::FRAC_PI_2;
        let kernel = LissajousKernel::new(&model).unwrap();
        // sin(pi/2) = 1: the first point starts on the fast-axis extreme.
        let first = kernel.produce(0);
        assert!((first.values[1] - 1.0).abs() < 1e-12);
        assert!(first.values[0].abs() < 1e-12);
    }
}
