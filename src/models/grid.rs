//! Two-dimensional box-filling models: count-driven grids, step-driven
//! rasters and the seeded random-offset grid.

use serde::{Deserialize, Serialize};

use crate::error::ScanResult;

use super::bounds::BoundingBox;
use super::validate;

/// Rectangular grid of `fast_count` x `slow_count` points inside a bounding
/// box, placed at cell centres.
///
/// The fast axis varies quickest. With `snake` set, odd slow-axis rows are
/// visited in reverse so the stage never flies back; the per-axis indices a
/// position carries stay logical (column, row), untouched by the traversal
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridModel {
    /// Name of the fast (inner) axis.
    pub fast_axis: String,
    /// Name of the slow (outer) axis.
    pub slow_axis: String,
    /// Number of points along the fast axis.
    pub fast_count: u64,
    /// Number of points along the slow axis.
    pub slow_count: u64,
    /// Reverse odd rows in visit order.
    #[serde(default)]
    pub snake: bool,
    /// The rectangle to fill. Required before a generator can be built;
    /// usually supplied directly, or inferred from regions of interest.
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl GridModel {
    /// Convenience constructor with zero exposure and no snaking.
    pub fn new(
        fast_axis: impl Into<String>,
        slow_axis: impl Into<String>,
        fast_count: u64,
        slow_count: u64,
        bounding_box: BoundingBox,
    ) -> Self {
        Self {
            fast_axis: fast_axis.into(),
            slow_axis: slow_axis.into(),
            fast_count,
            slow_count,
            snake: false,
            bounding_box: Some(bounding_box),
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_pair("grid", &self.fast_axis, &self.slow_axis)?;
        validate::exposure("grid", self.exposure_time)?;
        validate::count("grid", "fastCount", self.fast_count)?;
        validate::count("grid", "slowCount", self.slow_count)?;
        validate::bounding_box("grid", self.bounding_box.as_ref())
    }
}

impl Default for GridModel {
    fn default() -> Self {
        GridModel::new("x", "y", 5, 5, BoundingBox::new(0.0, 0.0, 1.0, 1.0))
    }
}

/// Rectangular raster over a bounding box, points at whole step multiples
/// from the box origin, inclusive of both edges where the steps land on them.
///
/// Steps are positive lengths; the direction of travel along each axis follows
/// the sign of the corresponding box length. Snaking behaves as for
/// [`GridModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterModel {
    /// Name of the fast (inner) axis.
    pub fast_axis: String,
    /// Name of the slow (outer) axis.
    pub slow_axis: String,
    /// Distance between points along the fast axis.
    pub fast_step: f64,
    /// Distance between points along the slow axis.
    pub slow_step: f64,
    /// Reverse odd rows in visit order.
    #[serde(default)]
    pub snake: bool,
    /// The rectangle to cover. Required before a generator can be built.
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl RasterModel {
    /// Convenience constructor with zero exposure and no snaking.
    pub fn new(
        fast_axis: impl Into<String>,
        slow_axis: impl Into<String>,
        fast_step: f64,
        slow_step: f64,
        bounding_box: BoundingBox,
    ) -> Self {
        Self {
            fast_axis: fast_axis.into(),
            slow_axis: slow_axis.into(),
            fast_step,
            slow_step,
            snake: false,
            bounding_box: Some(bounding_box),
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_pair("raster", &self.fast_axis, &self.slow_axis)?;
        validate::exposure("raster", self.exposure_time)?;
        validate::positive("raster", "fastStep", self.fast_step)?;
        validate::positive("raster", "slowStep", self.slow_step)?;
        validate::bounding_box("raster", self.bounding_box.as_ref())
    }
}

impl Default for RasterModel {
    fn default() -> Self {
        RasterModel::new("x", "y", 0.25, 0.25, BoundingBox::new(0.0, 0.0, 1.0, 1.0))
    }
}

/// A [`GridModel`] whose points are perturbed by a reproducible pseudo-random
/// offset.
///
/// Each nominal cell centre is displaced by up to `offset` percent of the
/// fast-axis cell size in both axes. The displacement of a point depends only
/// on `seed` and the point's logical (column, row) indices, so a model
/// re-instantiated with the same seed yields bit-identical positions in any
/// traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomOffsetGridModel {
    /// Name of the fast (inner) axis.
    pub fast_axis: String,
    /// Name of the slow (outer) axis.
    pub slow_axis: String,
    /// Number of points along the fast axis.
    pub fast_count: u64,
    /// Number of points along the slow axis.
    pub slow_count: u64,
    /// Reverse odd rows in visit order.
    #[serde(default)]
    pub snake: bool,
    /// The rectangle to fill. Required before a generator can be built.
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    /// Seed for the offset stream.
    #[serde(default)]
    pub seed: u64,
    /// Maximum displacement, as a percentage of the fast-axis cell size.
    pub offset: f64,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl RandomOffsetGridModel {
    /// Convenience constructor with zero exposure and no snaking.
    pub fn new(
        fast_axis: impl Into<String>,
        slow_axis: impl Into<String>,
        fast_count: u64,
        slow_count: u64,
        bounding_box: BoundingBox,
        seed: u64,
        offset: f64,
    ) -> Self {
        Self {
            fast_axis: fast_axis.into(),
            slow_axis: slow_axis.into(),
            fast_count,
            slow_count,
            snake: false,
            bounding_box: Some(bounding_box),
            seed,
            offset,
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_pair("random_offset_grid", &self.fast_axis, &self.slow_axis)?;
        validate::exposure("random_offset_grid", self.exposure_time)?;
        validate::count("random_offset_grid", "fastCount", self.fast_count)?;
        validate::count("random_offset_grid", "slowCount", self.slow_count)?;
        validate::non_negative("random_offset_grid", "offset", self.offset)?;
        validate::bounding_box("random_offset_grid", self.bounding_box.as_ref())
    }
}

impl Default for RandomOffsetGridModel {
    fn default() -> Self {
        RandomOffsetGridModel::new(
            "x",
            "y",
            5,
            5,
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            0,
            10.0,
        )
    }
}
