//! Straight-line models over two axes, bounded by a [`BoundingLine`].

use serde::{Deserialize, Serialize};

use crate::error::ScanResult;

use super::bounds::BoundingLine;
use super::validate;

/// `points` positions spread evenly along a bounding line.
///
/// Each point sits at the centre of its share of the line: point `i` of `n`
/// lies at parameter `(i + 0.5)/n` of the length, so neither endpoint is
/// visited. Both axes move together; positions carry the projection of the
/// line parameter onto the fast and slow axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneDEqualSpacingModel {
    /// Name of the fast axis (the ROI x direction).
    pub fast_axis: String,
    /// Name of the slow axis (the ROI y direction).
    pub slow_axis: String,
    /// Number of positions along the line.
    pub points: u64,
    /// The line to cover. Required before a generator can be built; usually
    /// supplied directly, or taken from a linear region of interest.
    #[serde(default)]
    pub bounding_line: Option<BoundingLine>,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl OneDEqualSpacingModel {
    /// Convenience constructor with zero exposure.
    pub fn new(
        fast_axis: impl Into<String>,
        slow_axis: impl Into<String>,
        points: u64,
        bounding_line: BoundingLine,
    ) -> Self {
        Self {
            fast_axis: fast_axis.into(),
            slow_axis: slow_axis.into(),
            points,
            bounding_line: Some(bounding_line),
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_pair("one_d_equal_spacing", &self.fast_axis, &self.slow_axis)?;
        validate::exposure("one_d_equal_spacing", self.exposure_time)?;
        validate::count("one_d_equal_spacing", "points", self.points)?;
        validate::bounding_line("one_d_equal_spacing", self.bounding_line.as_ref())
    }
}

impl Default for OneDEqualSpacingModel {
    fn default() -> Self {
        OneDEqualSpacingModel::new("x", "y", 5, BoundingLine::new(0.0, 0.0, 1.0, 0.0))
    }
}

/// Positions along a bounding line at whole multiples of `step` from its
/// origin, starting on the origin itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneDStepModel {
    /// Name of the fast axis (the ROI x direction).
    pub fast_axis: String,
    /// Name of the slow axis (the ROI y direction).
    pub slow_axis: String,
    /// Distance between positions along the line.
    pub step: f64,
    /// The line to cover. Required before a generator can be built.
    #[serde(default)]
    pub bounding_line: Option<BoundingLine>,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl OneDStepModel {
    /// Convenience constructor with zero exposure.
    pub fn new(
        fast_axis: impl Into<String>,
        slow_axis: impl Into<String>,
        step: f64,
        bounding_line: BoundingLine,
    ) -> Self {
        Self {
            fast_axis: fast_axis.into(),
            slow_axis: slow_axis.into(),
            step,
            bounding_line: Some(bounding_line),
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_pair("one_d_step", &self.fast_axis, &self.slow_axis)?;
        validate::exposure("one_d_step", self.exposure_time)?;
        validate::positive("one_d_step", "step", self.step)?;
        validate::bounding_line("one_d_step", self.bounding_line.as_ref())
    }
}

impl Default for OneDStepModel {
    fn default() -> Self {
        OneDStepModel::new("x", "y", 0.25, BoundingLine::new(0.0, 0.0, 1.0, 0.0))
    }
}
