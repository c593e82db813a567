//! Declarative scan-path models.
//!
//! A model is plain data describing a path: which axes move, over what range
//! or shape, with what exposure. Models stay inert until handed to the
//! [`GeneratorRegistry`](crate::registry::GeneratorRegistry), which validates
//! them and builds a [`PointGenerator`](crate::generator::PointGenerator).
//!
//! All models serialise with a `type` tag and camelCase fields:
//!
//! ```json
//! { "type": "step", "axis": "x", "start": 0.0, "stop": 10.0, "step": 2.0 }
//! ```
//!
//! Two-axis models name a *fast* and a *slow* axis; positions list the slow
//! axis first, so the fast value is always the last entry. Box-bounded models
//! (grid, raster, spiral, Lissajous) and line-bounded models (the 1-D line
//! pair) need their bounding shape set, either directly or inferred from
//! regions of interest, before a generator can be built.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, ScanResult};

pub mod bounds;
mod compound;
mod freeform;
mod grid;
mod line;
mod step;

pub use bounds::{BoundingBox, BoundingLine};
pub use compound::CompoundModel;
pub use freeform::{LissajousModel, SpiralModel};
pub use grid::{GridModel, RandomOffsetGridModel, RasterModel};
pub use line::{OneDEqualSpacingModel, OneDStepModel};
pub use step::{
    ArrayModel, CollatedStepModel, MultiStepModel, RepeatedPointModel, StaticModel, StepModel,
    StepSegment,
};

pub(crate) use compound::region_applies;

// ============================================================================
// Model kinds
// ============================================================================

/// The kind tag of a scan-path model, used for registry dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Evenly stepped single-axis sweep.
    Step,
    /// Stepped sweep driving several axes with one value.
    CollatedStep,
    /// Several stepped ranges of one axis, back to back.
    MultiStep,
    /// Explicit list of axis values.
    Array,
    /// One value repeated a fixed number of times.
    RepeatedPoint,
    /// Axis-less frame counter.
    Static,
    /// Count-driven rectangular grid.
    Grid,
    /// Step-driven rectangular raster.
    Raster,
    /// Grid with seeded pseudo-random offsets.
    RandomOffsetGrid,
    /// Evenly spaced points along a line.
    OneDEqualSpacing,
    /// Stepped points along a line.
    OneDStep,
    /// Archimedean spiral filling a box.
    Spiral,
    /// Lissajous figure inscribed in a box.
    Lissajous,
}

impl ModelKind {
    /// Every kind, in registry order.
    pub const ALL: [ModelKind; 13] = [
        ModelKind::Step,
        ModelKind::CollatedStep,
        ModelKind::MultiStep,
        ModelKind::Array,
        ModelKind::RepeatedPoint,
        ModelKind::Static,
        ModelKind::Grid,
        ModelKind::Raster,
        ModelKind::RandomOffsetGrid,
        ModelKind::OneDEqualSpacing,
        ModelKind::OneDStep,
        ModelKind::Spiral,
        ModelKind::Lissajous,
    ];

    /// The serialised tag of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Step => "step",
            ModelKind::CollatedStep => "collated_step",
            ModelKind::MultiStep => "multi_step",
            ModelKind::Array => "array",
            ModelKind::RepeatedPoint => "repeated_point",
            ModelKind::Static => "static",
            ModelKind::Grid => "grid",
            ModelKind::Raster => "raster",
            ModelKind::RandomOffsetGrid => "random_offset_grid",
            ModelKind::OneDEqualSpacing => "one_d_equal_spacing",
            ModelKind::OneDStep => "one_d_step",
            ModelKind::Spiral => "spiral",
            ModelKind::Lissajous => "lissajous",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// The model sum type
// ============================================================================

/// A scan-path model of any supported kind.
///
/// The enum is the wire format: the variant is selected by the `type` tag and
/// each variant's fields serialise camelCase. See the module docs for the
/// shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanPathModel {
    /// See [`StepModel`].
    Step(StepModel),
    /// See [`CollatedStepModel`].
    CollatedStep(CollatedStepModel),
    /// See [`MultiStepModel`].
    MultiStep(MultiStepModel),
    /// See [`ArrayModel`].
    Array(ArrayModel),
    /// See [`RepeatedPointModel`].
    RepeatedPoint(RepeatedPointModel),
    /// See [`StaticModel`].
    Static(StaticModel),
    /// See [`GridModel`].
    Grid(GridModel),
    /// See [`RasterModel`].
    Raster(RasterModel),
    /// See [`RandomOffsetGridModel`].
    RandomOffsetGrid(RandomOffsetGridModel),
    /// See [`OneDEqualSpacingModel`].
    OneDEqualSpacing(OneDEqualSpacingModel),
    /// See [`OneDStepModel`].
    OneDStep(OneDStepModel),
    /// See [`SpiralModel`].
    Spiral(SpiralModel),
    /// See [`LissajousModel`].
    Lissajous(LissajousModel),
}

impl ScanPathModel {
    /// The kind tag of this model.
    pub fn kind(&self) -> ModelKind {
        match self {
            ScanPathModel::Step(_) => ModelKind::Step,
            ScanPathModel::CollatedStep(_) => ModelKind::CollatedStep,
            ScanPathModel::MultiStep(_) => ModelKind::MultiStep,
            ScanPathModel::Array(_) => ModelKind::Array,
            ScanPathModel::RepeatedPoint(_) => ModelKind::RepeatedPoint,
            ScanPathModel::Static(_) => ModelKind::Static,
            ScanPathModel::Grid(_) => ModelKind::Grid,
            ScanPathModel::Raster(_) => ModelKind::Raster,
            ScanPathModel::RandomOffsetGrid(_) => ModelKind::RandomOffsetGrid,
            ScanPathModel::OneDEqualSpacing(_) => ModelKind::OneDEqualSpacing,
            ScanPathModel::OneDStep(_) => ModelKind::OneDStep,
            ScanPathModel::Spiral(_) => ModelKind::Spiral,
            ScanPathModel::Lissajous(_) => ModelKind::Lissajous,
        }
    }

    /// A valid default model of the given kind.
    pub fn default_for(kind: ModelKind) -> ScanPathModel {
        match kind {
            ModelKind::Step => ScanPathModel::Step(StepModel::default()),
            ModelKind::CollatedStep => ScanPathModel::CollatedStep(CollatedStepModel::default()),
            ModelKind::MultiStep => ScanPathModel::MultiStep(MultiStepModel::default()),
            ModelKind::Array => ScanPathModel::Array(ArrayModel::default()),
            ModelKind::RepeatedPoint => {
                ScanPathModel::RepeatedPoint(RepeatedPointModel::default())
            }
            ModelKind::Static => ScanPathModel::Static(StaticModel::default()),
            ModelKind::Grid => ScanPathModel::Grid(GridModel::default()),
            ModelKind::Raster => ScanPathModel::Raster(RasterModel::default()),
            ModelKind::RandomOffsetGrid => {
                ScanPathModel::RandomOffsetGrid(RandomOffsetGridModel::default())
            }
            ModelKind::OneDEqualSpacing => {
                ScanPathModel::OneDEqualSpacing(OneDEqualSpacingModel::default())
            }
            ModelKind::OneDStep => ScanPathModel::OneDStep(OneDStepModel::default()),
            ModelKind::Spiral => ScanPathModel::Spiral(SpiralModel::default()),
            ModelKind::Lissajous => ScanPathModel::Lissajous(LissajousModel::default()),
        }
    }

    /// The names of the axes this model drives, in position order.
    ///
    /// Two-axis models list the slow axis first and the fast axis second;
    /// static models drive no axis at all.
    pub fn axis_names(&self) -> Vec<String> {
        match self {
            ScanPathModel::Step(m) => vec![m.axis.clone()],
            ScanPathModel::CollatedStep(m) => m.axes.clone(),
            ScanPathModel::MultiStep(m) => vec![m.axis.clone()],
            ScanPathModel::Array(m) => vec![m.axis.clone()],
            ScanPathModel::RepeatedPoint(m) => vec![m.axis.clone()],
            ScanPathModel::Static(_) => Vec::new(),
            ScanPathModel::Grid(m) => vec![m.slow_axis.clone(), m.fast_axis.clone()],
            ScanPathModel::Raster(m) => vec![m.slow_axis.clone(), m.fast_axis.clone()],
            ScanPathModel::RandomOffsetGrid(m) => {
                vec![m.slow_axis.clone(), m.fast_axis.clone()]
            }
            ScanPathModel::OneDEqualSpacing(m) => {
                vec![m.slow_axis.clone(), m.fast_axis.clone()]
            }
            ScanPathModel::OneDStep(m) => vec![m.slow_axis.clone(), m.fast_axis.clone()],
            ScanPathModel::Spiral(m) => vec![m.slow_axis.clone(), m.fast_axis.clone()],
            ScanPathModel::Lissajous(m) => vec![m.slow_axis.clone(), m.fast_axis.clone()],
        }
    }

    /// The exposure time carried by this model, seconds.
    pub fn exposure_time(&self) -> f64 {
        match self {
            ScanPathModel::Step(m) => m.exposure_time,
            ScanPathModel::CollatedStep(m) => m.exposure_time,
            ScanPathModel::MultiStep(m) => m.exposure_time,
            ScanPathModel::Array(m) => m.exposure_time,
            ScanPathModel::RepeatedPoint(m) => m.exposure_time,
            ScanPathModel::Static(m) => m.exposure_time,
            ScanPathModel::Grid(m) => m.exposure_time,
            ScanPathModel::Raster(m) => m.exposure_time,
            ScanPathModel::RandomOffsetGrid(m) => m.exposure_time,
            ScanPathModel::OneDEqualSpacing(m) => m.exposure_time,
            ScanPathModel::OneDStep(m) => m.exposure_time,
            ScanPathModel::Spiral(m) => m.exposure_time,
            ScanPathModel::Lissajous(m) => m.exposure_time,
        }
    }

    /// Whether several named axes advance together with one scalar value.
    pub fn is_collated(&self) -> bool {
        matches!(self, ScanPathModel::CollatedStep(_))
    }

    /// Whether this kind carries a bounding box (grid, raster, spiral and
    /// Lissajous family).
    pub fn is_box_bounded(&self) -> bool {
        matches!(
            self,
            ScanPathModel::Grid(_)
                | ScanPathModel::Raster(_)
                | ScanPathModel::RandomOffsetGrid(_)
                | ScanPathModel::Spiral(_)
                | ScanPathModel::Lissajous(_)
        )
    }

    /// Whether this kind carries a bounding line (the 1-D line pair).
    pub fn is_line_bounded(&self) -> bool {
        matches!(
            self,
            ScanPathModel::OneDEqualSpacing(_) | ScanPathModel::OneDStep(_)
        )
    }

    /// The model's bounding box, when it has one set.
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        match self {
            ScanPathModel::Grid(m) => m.bounding_box.as_ref(),
            ScanPathModel::Raster(m) => m.bounding_box.as_ref(),
            ScanPathModel::RandomOffsetGrid(m) => m.bounding_box.as_ref(),
            ScanPathModel::Spiral(m) => m.bounding_box.as_ref(),
            ScanPathModel::Lissajous(m) => m.bounding_box.as_ref(),
            _ => None,
        }
    }

    /// Sets the bounding box of a box-bounded model.
    ///
    /// Fails with `UnsupportedOperation` for kinds that have no box.
    pub fn set_bounding_box(&mut self, bounding_box: BoundingBox) -> ScanResult<()> {
        match self {
            ScanPathModel::Grid(m) => m.bounding_box = Some(bounding_box),
            ScanPathModel::Raster(m) => m.bounding_box = Some(bounding_box),
            ScanPathModel::RandomOffsetGrid(m) => m.bounding_box = Some(bounding_box),
            ScanPathModel::Spiral(m) => m.bounding_box = Some(bounding_box),
            ScanPathModel::Lissajous(m) => m.bounding_box = Some(bounding_box),
            other => {
                return Err(GeneratorError::UnsupportedOperation {
                    operation: format!("set a bounding box on a '{}' model", other.kind()),
                })
            }
        }
        Ok(())
    }

    /// The model's bounding line, when it has one set.
    pub fn bounding_line(&self) -> Option<&BoundingLine> {
        match self {
            ScanPathModel::OneDEqualSpacing(m) => m.bounding_line.as_ref(),
            ScanPathModel::OneDStep(m) => m.bounding_line.as_ref(),
            _ => None,
        }
    }

    /// Sets the bounding line of a line-bounded model.
    ///
    /// Fails with `UnsupportedOperation` for kinds that have no line.
    pub fn set_bounding_line(&mut self, bounding_line: BoundingLine) -> ScanResult<()> {
        match self {
            ScanPathModel::OneDEqualSpacing(m) => m.bounding_line = Some(bounding_line),
            ScanPathModel::OneDStep(m) => m.bounding_line = Some(bounding_line),
            other => {
                return Err(GeneratorError::UnsupportedOperation {
                    operation: format!("set a bounding line on a '{}' model", other.kind()),
                })
            }
        }
        Ok(())
    }

    /// Checks the model's fields, the `InvalidModel` gate for generator
    /// construction.
    pub fn validate(&self) -> ScanResult<()> {
        match self {
            ScanPathModel::Step(m) => m.validate(),
            ScanPathModel::CollatedStep(m) => m.validate(),
            ScanPathModel::MultiStep(m) => m.validate(),
            ScanPathModel::Array(m) => m.validate(),
            ScanPathModel::RepeatedPoint(m) => m.validate(),
            ScanPathModel::Static(m) => m.validate(),
            ScanPathModel::Grid(m) => m.validate(),
            ScanPathModel::Raster(m) => m.validate(),
            ScanPathModel::RandomOffsetGrid(m) => m.validate(),
            ScanPathModel::OneDEqualSpacing(m) => m.validate(),
            ScanPathModel::OneDStep(m) => m.validate(),
            ScanPathModel::Spiral(m) => m.validate(),
            ScanPathModel::Lissajous(m) => m.validate(),
        }
    }
}

// Structural conversions from the variant structs.
macro_rules! impl_from_model {
    ($($variant:ident => $model:ty),* $(,)?) => {
        $(impl From<$model> for ScanPathModel {
            fn from(model: $model) -> Self {
                ScanPathModel::$variant(model)
            }
        })*
    };
}

impl_from_model! {
    Step => StepModel,
    CollatedStep => CollatedStepModel,
    MultiStep => MultiStepModel,
    Array => ArrayModel,
    RepeatedPoint => RepeatedPointModel,
    Static => StaticModel,
    Grid => GridModel,
    Raster => RasterModel,
    RandomOffsetGrid => RandomOffsetGridModel,
    OneDEqualSpacing => OneDEqualSpacingModel,
    OneDStep => OneDStepModel,
    Spiral => SpiralModel,
    Lissajous => LissajousModel,
}

// ============================================================================
// Shared field checks
// ============================================================================

pub(crate) mod validate {
    //! Small field checks shared by the model `validate` implementations.

    use crate::error::{GeneratorError, ScanResult};

    use super::bounds::{BoundingBox, BoundingLine};

    pub(crate) fn axis_name(model: &str, axis: &str) -> ScanResult<()> {
        if axis.is_empty() {
            return Err(GeneratorError::invalid(model, "axis name must not be empty"));
        }
        Ok(())
    }

    pub(crate) fn axis_list(model: &str, axes: &[String]) -> ScanResult<()> {
        if axes.is_empty() {
            return Err(GeneratorError::invalid(
                model,
                "at least one axis name is required",
            ));
        }
        for (i, axis) in axes.iter().enumerate() {
            axis_name(model, axis)?;
            if axes[..i].contains(axis) {
                return Err(GeneratorError::invalid(
                    model,
                    format!("axis '{axis}' is listed twice"),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn axis_pair(model: &str, fast: &str, slow: &str) -> ScanResult<()> {
        axis_name(model, fast)?;
        axis_name(model, slow)?;
        if fast == slow {
            return Err(GeneratorError::invalid(
                model,
                format!("fast and slow axes must differ, both are '{fast}'"),
            ));
        }
        Ok(())
    }

    pub(crate) fn finite(model: &str, field: &str, value: f64) -> ScanResult<()> {
        if !value.is_finite() {
            return Err(GeneratorError::invalid(
                model,
                format!("{field} must be finite, got {value}"),
            ));
        }
        Ok(())
    }

    pub(crate) fn all_finite(
        model: &str,
        field: &str,
        values: impl IntoIterator<Item = f64>,
    ) -> ScanResult<()> {
        for value in values {
            finite(model, field, value)?;
        }
        Ok(())
    }

    pub(crate) fn exposure(model: &str, value: f64) -> ScanResult<()> {
        finite(model, "exposureTime", value)?;
        if value < 0.0 {
            return Err(GeneratorError::invalid(
                model,
                format!("exposureTime must not be negative, got {value}"),
            ));
        }
        Ok(())
    }

    pub(crate) fn positive(model: &str, field: &str, value: f64) -> ScanResult<()> {
        finite(model, field, value)?;
        if value <= 0.0 {
            return Err(GeneratorError::invalid(
                model,
                format!("{field} must be positive, got {value}"),
            ));
        }
        Ok(())
    }

    pub(crate) fn non_negative(model: &str, field: &str, value: f64) -> ScanResult<()> {
        finite(model, field, value)?;
        if value < 0.0 {
            return Err(GeneratorError::invalid(
                model,
                format!("{field} must not be negative, got {value}"),
            ));
        }
        Ok(())
    }

    pub(crate) fn count(model: &str, field: &str, value: u64) -> ScanResult<()> {
        if value == 0 {
            return Err(GeneratorError::invalid(
                model,
                format!("{field} must be at least 1"),
            ));
        }
        Ok(())
    }

    /// A stepped range must have a nonzero, finite step pointing from `start`
    /// towards `stop`. `start == stop` is the degenerate single point.
    pub(crate) fn step_range(model: &str, start: f64, stop: f64, step: f64) -> ScanResult<()> {
        finite(model, "start", start)?;
        finite(model, "stop", stop)?;
        finite(model, "step", step)?;
        if step == 0.0 {
            return Err(GeneratorError::invalid(model, "step must not be zero"));
        }
        if start != stop && (stop - start).signum() != step.signum() {
            return Err(GeneratorError::invalid(
                model,
                format!("step {step} points away from stop {stop} (start {start})"),
            ));
        }
        Ok(())
    }

    pub(crate) fn bounding_box(model: &str, bounding_box: Option<&BoundingBox>) -> ScanResult<()> {
        let Some(bx) = bounding_box else {
            return Err(GeneratorError::invalid(
                model,
                "a bounding box is required; set one or supply regions of interest",
            ));
        };
        finite(model, "fastAxisStart", bx.fast_axis_start)?;
        finite(model, "slowAxisStart", bx.slow_axis_start)?;
        finite(model, "fastAxisLength", bx.fast_axis_length)?;
        finite(model, "slowAxisLength", bx.slow_axis_length)
    }

    pub(crate) fn bounding_line(
        model: &str,
        bounding_line: Option<&BoundingLine>,
    ) -> ScanResult<()> {
        let Some(line) = bounding_line else {
            return Err(GeneratorError::invalid(
                model,
                "a bounding line is required; set one or supply a linear region",
            ));
        };
        finite(model, "xStart", line.x_start)?;
        finite(model, "yStart", line.y_start)?;
        finite(model, "angle", line.angle)?;
        non_negative(model, "length", line.length)
    }
}
