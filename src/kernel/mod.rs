//! Path kernels: the per-shape numeric cores behind the generators.
//!
//! A kernel maps a point ordinal to raw coordinates. It owns the counting
//! rule and the geometry of one model kind and nothing else; naming the axes,
//! assigning step indices, gating against regions and exposure bookkeeping
//! all happen in the [`generator`](crate::generator) layer on top.
//!
//! Kernels are immutable once built, so a generator can be re-created from
//! the same model and replay an identical sequence.

use crate::error::{GeneratorError, ScanResult};
use crate::models::bounds::{BoundingBox, BoundingLine};
use crate::models::ScanPathModel;

mod freeform;
mod grid;
mod line;
mod step;

pub(crate) use step::stepped_count;

// Validation runs before kernel construction, so a missing bounding shape
// here means the caller skipped the gate.
fn require_box(model: &str, bounding_box: Option<&BoundingBox>) -> ScanResult<BoundingBox> {
    bounding_box.copied().ok_or_else(|| {
        GeneratorError::invalid(model, "a bounding box is required before generation")
    })
}

fn require_line(model: &str, bounding_line: Option<&BoundingLine>) -> ScanResult<BoundingLine> {
    bounding_line.copied().ok_or_else(|| {
        GeneratorError::invalid(model, "a bounding line is required before generation")
    })
}

/// Raw output of a kernel for one point ordinal.
///
/// `values` and `indices` are aligned with the model's axis declaration
/// order (slow axis first for two-axis models). `indices` carries logical
/// grid indices where the model has them and
/// [`UNINDEXED`](crate::position::UNINDEXED) otherwise. A kernel may override
/// the model exposure for individual points; `None` defers to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    /// Axis values in declaration order.
    pub values: Vec<f64>,
    /// Per-axis indices in declaration order.
    pub indices: Vec<i64>,
    /// Per-point exposure override, seconds.
    pub exposure: Option<f64>,
}

impl RawPoint {
    /// A point with no exposure override.
    pub fn new(values: Vec<f64>, indices: Vec<i64>) -> Self {
        Self {
            values,
            indices,
            exposure: None,
        }
    }
}

/// The numeric core of one scan path.
///
/// `produce` must be a pure function of `index`; the generator calls it with
/// ordinals `0..count()` in whatever order gating dictates and assembles full
/// positions from the result.
pub trait PathKernel: Send + Sync {
    /// Total number of points this kernel can produce.
    fn count(&self) -> u64;

    /// The raw point at `index`, which the caller keeps below [`count`].
    ///
    /// [`count`]: PathKernel::count
    fn produce(&self, index: u64) -> RawPoint;
}

/// Builds the native kernel for a model. The model must already have passed
/// [`ScanPathModel::validate`].
pub(crate) fn for_model(model: &ScanPathModel) -> ScanResult<Box<dyn PathKernel>> {
    Ok(match model {
        ScanPathModel::Step(m) => Box::new(step::StepKernel::new(m)),
        ScanPathModel::CollatedStep(m) => Box::new(step::CollatedStepKernel::new(m)),
        ScanPathModel::MultiStep(m) => Box::new(step::MultiStepKernel::new(m)),
        ScanPathModel::Array(m) => Box::new(step::ArrayKernel::new(m)),
        ScanPathModel::RepeatedPoint(m) => Box::new(step::RepeatedPointKernel::new(m)),
        ScanPathModel::Static(m) => Box::new(step::StaticKernel::new(m)),
        ScanPathModel::Grid(m) => Box::new(grid::GridKernel::new(m)?),
        ScanPathModel::Raster(m) => Box::new(grid::RasterKernel::new(m)?),
        ScanPathModel::RandomOffsetGrid(m) => Box::new(grid::RandomOffsetGridKernel::new(m)?),
        ScanPathModel::OneDEqualSpacing(m) => Box::new(line::EqualSpacingLineKernel::new(m)?),
        ScanPathModel::OneDStep(m) => Box::new(line::SteppedLineKernel::new(m)?),
        ScanPathModel::Spiral(m) => Box::new(freeform::SpiralKernel::new(m)?),
        ScanPathModel::Lissajous(m) => Box::new(freeform::LissajousKernel::new(m)?),
    })
}
