//! One-dimensional scan models: stepped ranges, explicit arrays, repeated
//! points and the axis-less static counter.

use serde::{Deserialize, Serialize};

use crate::error::ScanResult;

use super::validate;

/// Evenly stepped sweep of a single axis from `start` towards `stop`.
///
/// The sweep is inclusive of `start`; the number of emitted values is
/// `floor((stop - start) / step) + 1`, so `stop` itself is visited only when
/// the range is a whole number of steps. Direction follows the sign of
/// `stop - start` and `step` must point the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepModel {
    /// Name of the driven axis.
    pub axis: String,
    /// First emitted value.
    pub start: f64,
    /// Target value; visited only when reached by a whole step.
    pub stop: f64,
    /// Signed increment between values.
    pub step: f64,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl StepModel {
    /// Convenience constructor with zero exposure.
    pub fn new(axis: impl Into<String>, start: f64, stop: f64, step: f64) -> Self {
        Self {
            axis: axis.into(),
            start,
            stop,
            step,
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_name("step", &self.axis)?;
        validate::exposure("step", self.exposure_time)?;
        validate::step_range("step", self.start, self.stop, self.step)
    }
}

impl Default for StepModel {
    fn default() -> Self {
        StepModel::new("x", 0.0, 1.0, 1.0)
    }
}

/// Stepped sweep that drives several named axes with the same scalar value.
///
/// Every axis in `axes` advances in lockstep; emitted positions carry the
/// value under each name and leave the per-axis grid index unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollatedStepModel {
    /// Names of the collated axes, all driven with the same value.
    pub axes: Vec<String>,
    /// First emitted value.
    pub start: f64,
    /// Target value.
    pub stop: f64,
    /// Signed increment between values.
    pub step: f64,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl CollatedStepModel {
    /// Convenience constructor with zero exposure.
    pub fn new<S: Into<String>>(axes: Vec<S>, start: f64, stop: f64, step: f64) -> Self {
        Self {
            axes: axes.into_iter().map(Into::into).collect(),
            start,
            stop,
            step,
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_list("collated_step", &self.axes)?;
        validate::exposure("collated_step", self.exposure_time)?;
        validate::step_range("collated_step", self.start, self.stop, self.step)
    }
}

impl Default for CollatedStepModel {
    fn default() -> Self {
        CollatedStepModel::new(vec!["x", "y"], 0.0, 1.0, 1.0)
    }
}

/// One stepped range of a [`MultiStepModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSegment {
    /// First value of the segment.
    pub start: f64,
    /// Target value of the segment.
    pub stop: f64,
    /// Signed increment within the segment.
    pub step: f64,
    /// Per-segment exposure override, seconds. Zero defers to the model's
    /// exposure time.
    #[serde(default)]
    pub exposure_time: f64,
}

impl StepSegment {
    /// Builds a segment with no exposure override.
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self {
            start,
            stop,
            step,
            exposure_time: 0.0,
        }
    }

    /// Builds a segment with a per-segment exposure time.
    pub fn with_exposure(start: f64, stop: f64, step: f64, exposure_time: f64) -> Self {
        Self {
            start,
            stop,
            step,
            exposure_time,
        }
    }
}

/// Several stepped ranges of one axis, visited back to back.
///
/// Segments concatenate in order; boundary values shared by consecutive
/// segments are emitted by both. A segment's exposure override, when non-zero,
/// replaces the model exposure for the positions of that segment; the usual
/// use is an absorption scan with longer dwells across an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiStepModel {
    /// Name of the driven axis.
    pub axis: String,
    /// The stepped ranges, visited in order. Empty means an empty scan.
    pub segments: Vec<StepSegment>,
    /// Exposure time for segments without an override, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl MultiStepModel {
    /// Convenience constructor with zero exposure.
    pub fn new(axis: impl Into<String>, segments: Vec<StepSegment>) -> Self {
        Self {
            axis: axis.into(),
            segments,
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_name("multi_step", &self.axis)?;
        validate::exposure("multi_step", self.exposure_time)?;
        for segment in &self.segments {
            validate::exposure("multi_step", segment.exposure_time)?;
            validate::step_range("multi_step", segment.start, segment.stop, segment.step)?;
        }
        Ok(())
    }
}

impl Default for MultiStepModel {
    fn default() -> Self {
        MultiStepModel::new("x", vec![StepSegment::new(0.0, 1.0, 1.0)])
    }
}

/// Explicit list of axis values, visited in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayModel {
    /// Name of the driven axis.
    pub axis: String,
    /// The values to visit. Empty means an empty scan.
    pub values: Vec<f64>,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl ArrayModel {
    /// Convenience constructor with zero exposure.
    pub fn new(axis: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            axis: axis.into(),
            values,
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_name("array", &self.axis)?;
        validate::exposure("array", self.exposure_time)?;
        validate::all_finite("array", "values", self.values.iter().copied())
    }
}

impl Default for ArrayModel {
    fn default() -> Self {
        ArrayModel::new("x", vec![0.0])
    }
}

/// The same axis value, emitted `count` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatedPointModel {
    /// Name of the driven axis.
    pub axis: String,
    /// The value held for every position.
    pub value: f64,
    /// Number of positions to emit.
    pub count: u64,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl RepeatedPointModel {
    /// Convenience constructor with zero exposure.
    pub fn new(axis: impl Into<String>, value: f64, count: u64) -> Self {
        Self {
            axis: axis.into(),
            value,
            count,
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::axis_name("repeated_point", &self.axis)?;
        validate::exposure("repeated_point", self.exposure_time)?;
        validate::finite("repeated_point", "value", self.value)
    }
}

impl Default for RepeatedPointModel {
    fn default() -> Self {
        RepeatedPointModel::new("x", 0.0, 1)
    }
}

/// `count` positions that drive no axis at all.
///
/// Used as a counter, for example a detector taking `count` frames at a fixed
/// location while nothing moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticModel {
    /// Number of empty positions to emit.
    pub count: u64,
    /// Exposure time per position, seconds.
    #[serde(default)]
    pub exposure_time: f64,
}

impl StaticModel {
    /// Convenience constructor with zero exposure.
    pub fn new(count: u64) -> Self {
        Self {
            count,
            exposure_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        validate::exposure("static", self.exposure_time)
    }
}

impl Default for StaticModel {
    fn default() -> Self {
        StaticModel::new(1)
    }
}
