//! Kernels for the box-filling grid family.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ScanResult;
use crate::models::{GridModel, RandomOffsetGridModel, RasterModel};

use super::{require_box, stepped_count, PathKernel, RawPoint};

// Shared 2-D traversal arithmetic: flat ordinal -> logical (row, col) with
// odd rows reversed when snaking.
#[derive(Debug, Clone, Copy)]
struct Traversal {
    fast_count: u64,
    slow_count: u64,
    snake: bool,
}

impl Traversal {
    fn count(&self) -> u64 {
        self.fast_count.saturating_mul(self.slow_count)
    }

    fn cell(&self, index: u64) -> (u64, u64) {
        let row = index / self.fast_count;
        let walked = index % self.fast_count;
        let col = if self.snake && row % 2 == 1 {
            self.fast_count - 1 - walked
        } else {
            walked
        };
        (row, col)
    }
}

/// Cell-centred grid: `fast_count` x `slow_count` points, fast axis fastest.
pub(crate) struct GridKernel {
    traversal: Traversal,
    fast_origin: f64,
    fast_cell: f64,
    slow_origin: f64,
    slow_cell: f64,
}

impl GridKernel {
    pub(crate) fn new(model: &GridModel) -> ScanResult<Self> {
        let bx = require_box("grid", model.bounding_box.as_ref())?;
        Ok(Self {
            traversal: Traversal {
                fast_count: model.fast_count,
                slow_count: model.slow_count,
                snake: model.snake,
            },
            fast_origin: bx.fast_axis_start,
            fast_cell: bx.fast_axis_length / model.fast_count as f64,
            slow_origin: bx.slow_axis_start,
            slow_cell: bx.slow_axis_length / model.slow_count as f64,
        })
    }

    fn centre(&self, row: u64, col: u64) -> (f64, f64) {
        let fast = self.fast_origin + (col as f64 + 0.5) * self.fast_cell;
        let slow = self.slow_origin + (row as f64 + 0.5) * self.slow_cell;
        (slow, fast)
    }
}

impl PathKernel for GridKernel {
    fn count(&self) -> u64 {
        self.traversal.count()
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.count());
        let (row, col) = self.traversal.cell(index);
        let (slow, fast) = self.centre(row, col);
        RawPoint::new(vec![slow, fast], vec![row as i64, col as i64])
    }
}

/// Step-multiple raster: points on whole multiples of the step from the box
/// origin, both edges included where a step lands on them.
pub(crate) struct RasterKernel {
    traversal: Traversal,
    fast_origin: f64,
    fast_step: f64,
    slow_origin: f64,
    slow_step: f64,
}

impl RasterKernel {
    pub(crate) fn new(model: &RasterModel) -> ScanResult<Self> {
        let bx = require_box("raster", model.bounding_box.as_ref())?;
        // Step magnitudes are validated positive; the travel direction along
        // each axis comes from the sign of the box length.
        let fast_dir = if bx.fast_axis_length < 0.0 { -1.0 } else { 1.0 };
        let slow_dir = if bx.slow_axis_length < 0.0 { -1.0 } else { 1.0 };
        Ok(Self {
            traversal: Traversal {
                fast_count: stepped_count(0.0, bx.fast_axis_length.abs(), model.fast_step),
                slow_count: stepped_count(0.0, bx.slow_axis_length.abs(), model.slow_step),
                snake: model.snake,
            },
            fast_origin: bx.fast_axis_start,
            fast_step: model.fast_step * fast_dir,
            slow_origin: bx.slow_axis_start,
            slow_step: model.slow_step * slow_dir,
        })
    }
}

impl PathKernel for RasterKernel {
    fn count(&self) -> u64 {
        self.traversal.count()
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.count());
        let (row, col) = self.traversal.cell(index);
        let fast = self.fast_origin + col as f64 * self.fast_step;
        let slow = self.slow_origin + row as f64 * self.slow_step;
        RawPoint::new(vec![slow, fast], vec![row as i64, col as i64])
    }
}

/// Grid with a reproducible pseudo-random displacement per cell.
pub(crate) struct RandomOffsetGridKernel {
    grid: GridKernel,
    seed: u64,
    max_offset: f64,
}

impl RandomOffsetGridKernel {
    pub(crate) fn new(model: &RandomOffsetGridModel) -> ScanResult<Self> {
        let nominal = GridModel {
            fast_axis: model.fast_axis.clone(),
            slow_axis: model.slow_axis.clone(),
            fast_count: model.fast_count,
            slow_count: model.slow_count,
            snake: model.snake,
            bounding_box: model.bounding_box,
            exposure_time: model.exposure_time,
        };
        let grid = GridKernel::new(&nominal)?;
        let max_offset = model.offset / 100.0 * grid.fast_cell.abs();
        Ok(Self {
            grid,
            seed: model.seed,
            max_offset,
        })
    }
}

// Distinct (seed, cell) triples must land on distinct RNG streams, and the
// stream for a cell must not depend on traversal order.
fn cell_seed(seed: u64, row: u64, col: u64) -> u64 {
    let mut h = seed
        .wrapping_add(col.wrapping_mul(0x9e37_79b9_7f4a_7c15))
        .wrapping_add(row.wrapping_mul(0xc2b2_ae3d_27d4_eb4f));
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h
}

impl PathKernel for RandomOffsetGridKernel {
    fn count(&self) -> u64 {
        self.grid.count()
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.count());
        let (row, col) = self.grid.traversal.cell(index);
        let (slow, fast) = self.grid.centre(row, col);
        if self.max_offset == 0.0 {
            return RawPoint::new(vec![slow, fast], vec![row as i64, col as i64]);
        }
        let mut rng = StdRng::seed_from_u64(cell_seed(self.seed, row, col));
        let fast_offset = rng.gen_range(-self.max_offset..=self.max_offset);
        let slow_offset = rng.gen_range(-self.max_offset..=self.max_offset);
        RawPoint::new(
            vec![slow + slow_offset, fast + fast_offset],
            vec![row as i64, col as i64],
        )
    }
}
