//! Free-form two-axis paths: the Archimedean spiral and the Lissajous figure.

use serde::{Deserialize, Serialize};

use crate::error::ScanResult;

use super::bounds::BoundingBox;
use super::validate;

/// Archimedean spiral winding outwards from the centre of the bounding box.
///
/// The radius grows by `scale` per full turn; points are laid down at roughly
/// equal path increments until the spiral leaves the circle that circumscribes
/// the box. Smaller scales give denser coverage and more points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpiralModel {
    /// Name of the fast axis (the ROI x direction).
    pub fast_axis: String,
    /// Name of the slow axis (the ROI y direction).
    pub slow_axis: String,
    /// Radial growth per turn; also sets the spacing between points.
    pub scale: f64,
    /// The rectangle whose centre and extent define the spiral. Required
    /// before a generator can be built.
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl SpiralModel {
    /// Convenience constructor with zero exposure.
    pub fn new(
        fast_axis: impl Into<String>,
        slow_axis: impl Into<String>,
        scale: f64,
        bounding_box: BoundingBox,
    ) -> Self {
        Self {
            fast_axis: fast_axis.into(),
            slow_axis: slow_axis.into(),
            scale,
            bounding_box: Some(bounding_box),
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_pair("spiral", &self.fast_axis, &self.slow_axis)?;
        validate::exposure("spiral", self.exposure_time)?;
        validate::positive("spiral", "scale", self.scale)?;
        validate::bounding_box("spiral", self.bounding_box.as_ref())
    }
}

impl Default for SpiralModel {
    fn default() -> Self {
        SpiralModel::new("x", "y", 1.0, BoundingBox::new(0.0, 0.0, 1.0, 1.0))
    }
}

/// Lissajous figure inscribed in the bounding box.
///
/// With lobe frequencies `a` and `b` and phase `delta`, point `i` of `points`
/// is placed at
/// `x = cx + (w/2)·sin(a·θ + delta)`, `y = cy + (h/2)·sin(b·θ)` where
/// `θ = 2π·i / points`. One full sweep of θ covers the figure once; choose
/// `points` against `a` and `b` to control how densely it is sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LissajousModel {
    /// Name of the fast axis (the ROI x direction).
    pub fast_axis: String,
    /// Name of the slow axis (the ROI y direction).
    pub slow_axis: String,
    /// Horizontal lobe frequency.
    pub a: f64,
    /// Vertical lobe frequency.
    pub b: f64,
    /// Phase offset of the horizontal oscillation, radians.
    #[serde(default)]
    pub delta: f64,
    /// Number of sample points over one sweep of the figure.
    pub points: u64,
    /// The rectangle the figure is inscribed in. Required before a generator
    /// can be built.
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl LissajousModel {
    /// Convenience constructor with zero exposure.
    pub fn new(
        fast_axis: impl Into<String>,
        slow_axis: impl Into<String>,
        a: f64,
        b: f64,
        points: u64,
        bounding_box: BoundingBox,
    ) -> Self {
        Self {
            fast_axis: fast_axis.into(),
            slow_axis: slow_axis.into(),
            a,
            b,
            delta: 0.0,
            points,
            bounding_box: Some(bounding_box),
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_pair("lissajous", &self.fast_axis, &self.slow_axis)?;
        validate::exposure("lissajous", self.exposure_time)?;
        validate::finite("lissajous", "a", self.a)?;
        validate::finite("lissajous", "b", self.b)?;
        validate::finite("lissajous", "delta", self.delta)?;
        validate::count("lissajous", "points", self.points)?;
        validate::bounding_box("lissajous", self.bounding_box.as_ref())
    }
}

impl Default for LissajousModel {
    fn default() -> Self {
        LissajousModel::new("x", "y", 1.0, 0.25, 503, BoundingBox::new(0.0, 0.0, 1.0, 1.0))
    }
}
