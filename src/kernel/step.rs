//! Kernels for the single-axis model family.

use crate::models::{
    ArrayModel, CollatedStepModel, MultiStepModel, RepeatedPointModel, StaticModel, StepModel,
};
use crate::position::UNINDEXED;

use super::{PathKernel, RawPoint};

/// Number of points visiting `start` towards `stop` in increments of `step`,
/// inclusive of `start`.
///
/// A tolerance of 1 % of one step is folded in before truncating, so a range
/// that is a whole number of steps up to floating-point drift keeps its
/// endpoint: `0..10` by `0.1` counts 101 points, not 100.
pub(crate) fn stepped_count(start: f64, stop: f64, step: f64) -> u64 {
    ((stop - start) / step + 0.01).floor() as u64 + 1
}

pub(crate) struct StepKernel {
    start: f64,
    step: f64,
    count: u64,
}

impl StepKernel {
    pub(crate) fn new(model: &StepModel) -> Self {
        Self {
            start: model.start,
            step: model.step,
            count: stepped_count(model.start, model.stop, model.step),
        }
    }
}

impl PathKernel for StepKernel {
    fn count(&self) -> u64 {
        self.count
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.count);
        let value = self.start + index as f64 * self.step;
        RawPoint::new(vec![value], vec![index as i64])
    }
}

/// One scalar sweep fanned out to several axes. The axes move together, so
/// none of them gets a grid index.
pub(crate) struct CollatedStepKernel {
    start: f64,
    step: f64,
    count: u64,
    axes: usize,
}

impl CollatedStepKernel {
    pub(crate) fn new(model: &CollatedStepModel) -> Self {
        Self {
            start: model.start,
            step: model.step,
            count: stepped_count(model.start, model.stop, model.step),
            axes: model.axes.len(),
        }
    }
}

impl PathKernel for CollatedStepKernel {
    fn count(&self) -> u64 {
        self.count
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.count);
        let value = self.start + index as f64 * self.step;
        RawPoint::new(vec![value; self.axes], vec![UNINDEXED; self.axes])
    }
}

struct Span {
    first: u64,
    count: u64,
    start: f64,
    step: f64,
    exposure: Option<f64>,
}

/// Concatenated stepped ranges. The per-axis index runs across the whole
/// concatenation and a segment's nonzero exposure overrides the model's.
pub(crate) struct MultiStepKernel {
    spans: Vec<Span>,
    total: u64,
}

impl MultiStepKernel {
    pub(crate) fn new(model: &MultiStepModel) -> Self {
        let mut spans = Vec::with_capacity(model.segments.len());
        let mut total = 0u64;
        for segment in &model.segments {
            let count = stepped_count(segment.start, segment.stop, segment.step);
            spans.push(Span {
                first: total,
                count,
                start: segment.start,
                step: segment.step,
                exposure: (segment.exposure_time > 0.0).then_some(segment.exposure_time),
            });
            total += count;
        }
        Self { spans, total }
    }
}

impl PathKernel for MultiStepKernel {
    fn count(&self) -> u64 {
        self.total
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.total);
        for span in &self.spans {
            if index < span.first + span.count {
                let value = span.start + (index - span.first) as f64 * span.step;
                return RawPoint {
                    values: vec![value],
                    indices: vec![index as i64],
                    exposure: span.exposure,
                };
            }
        }
        RawPoint::new(Vec::new(), Vec::new())
    }
}

pub(crate) struct ArrayKernel {
    values: Vec<f64>,
}

impl ArrayKernel {
    pub(crate) fn new(model: &ArrayModel) -> Self {
        Self {
            values: model.values.clone(),
        }
    }
}

impl PathKernel for ArrayKernel {
    fn count(&self) -> u64 {
        self.values.len() as u64
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!((index as usize) < self.values.len());
        let value = self.values.get(index as usize).copied().unwrap_or_default();
        RawPoint::new(vec![value], vec![index as i64])
    }
}

pub(crate) struct RepeatedPointKernel {
    value: f64,
    count: u64,
}

impl RepeatedPointKernel {
    pub(crate) fn new(model: &RepeatedPointModel) -> Self {
        Self {
            value: model.value,
            count: model.count,
        }
    }
}

impl PathKernel for RepeatedPointKernel {
    fn count(&self) -> u64 {
        self.count
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.count);
        RawPoint::new(vec![self.value], vec![index as i64])
    }
}

/// Axis-less frame counter: every point is empty.
pub(crate) struct StaticKernel {
    count: u64,
}

impl StaticKernel {
    pub(crate) fn new(model: &StaticModel) -> Self {
        Self { count: model.count }
    }
}

impl PathKernel for StaticKernel {
    fn count(&self) -> u64 {
        self.count
    }

    fn produce(&self, index: u64) -> RawPoint {
        debug_assert!(index < self.count);
        RawPoint::new(Vec::new(), Vec::new())
    }
}
