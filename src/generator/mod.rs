//! Point generators: lazy, single-use iterators over scan positions.
//!
//! A [`PointGenerator`] pairs a validated model with its
//! [`PathKernel`](crate::kernel::PathKernel) and walks the kernel's ordinals,
//! assembling full [`Position`]s, filtering them through the attached
//! [`PointContainer`](crate::region::PointContainer)s and stamping the step
//! index. Three access styles share one cursor:
//!
//! - plain [`Iterator`], where `None` is the terminal sentinel;
//! - `has_next()` lookahead, which peeks the next accepted position;
//! - the checked [`try_next`](PointGenerator::try_next), which distinguishes
//!   [`IterationExhausted`](crate::error::GeneratorError::IterationExhausted)
//!   from [`Aborted`](crate::error::GeneratorError::Aborted).
//!
//! Generators are not restartable: once exhausted they stay exhausted, and a
//! fresh scan means a fresh generator from the registry. Abort is signalled
//! through an [`AbortHandle`] from any thread and observed at the next
//! iteration boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, BoxStream};
use tracing::debug;

use crate::error::{GeneratorError, ScanResult};
use crate::kernel::{self, PathKernel};
use crate::models::ScanPathModel;
use crate::position::Position;
use crate::region::{PointContainer, Roi, RoiContainer};

mod compound;

pub use compound::CompoundGenerator;

/// A boxed stream of positions for stream-driven consumers.
pub type PointStream = BoxStream<'static, Position>;

/// Lifecycle state of a generator.
///
/// # State machine
///
/// ```text
/// Fresh ──next/has_next──> Running ──end of path──> Exhausted
///   │                         │                         │
///   └───────abort─────────────┴──────abort──────────────┘
///                             │
///                             ▼
///                          Aborted
/// ```
///
/// `Aborted` wins over every other state once the abort flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    /// Created, nothing consumed yet.
    Fresh,
    /// At least one position has been produced or skipped.
    Running,
    /// The path has been fully walked.
    Exhausted,
    /// Cancelled; the iterator yields nothing more.
    Aborted,
}

impl std::fmt::Display for GeneratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorState::Fresh => write!(f, "Fresh"),
            GeneratorState::Running => write!(f, "Running"),
            GeneratorState::Exhausted => write!(f, "Exhausted"),
            GeneratorState::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Cancels a generator from anywhere.
///
/// Cloneable and thread-safe; the flag only ever goes from clear to set, and
/// the owning generator observes it at its next iteration boundary.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests cancellation. Idempotent.
    pub fn abort(&self) {
        if !self.flag.swap(true, Ordering::Relaxed) {
            debug!("point generator aborted");
        }
    }

    /// Whether cancellation has been requested.
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Iterator over the positions of one scan path.
///
/// Built by the [`GeneratorRegistry`](crate::registry::GeneratorRegistry);
/// see the module docs for the iteration protocol.
pub struct PointGenerator {
    model: ScanPathModel,
    kernel: Box<dyn PathKernel>,
    names: Arc<[String]>,
    containers: Vec<Box<dyn PointContainer>>,
    regions: Vec<Roi>,
    label: Option<String>,
    description: Option<String>,
    exposure: f64,
    total: u64,
    cursor: u64,
    peeked: Option<Position>,
    phase: GeneratorState,
    abort: AbortHandle,
}

impl PointGenerator {
    pub(crate) fn from_parts(model: ScanPathModel, kernel: Box<dyn PathKernel>) -> Self {
        let names: Arc<[String]> = model.axis_names().into();
        let exposure = model.exposure_time();
        let total = kernel.count();
        Self {
            model,
            kernel,
            names,
            containers: Vec::new(),
            regions: Vec::new(),
            label: None,
            description: None,
            exposure,
            total,
            cursor: 0,
            peeked: None,
            phase: GeneratorState::Fresh,
            abort: AbortHandle::new(),
        }
    }

    /// Number of positions the ungated path contains.
    ///
    /// Attached regions can only reduce what the iterator actually emits;
    /// they never change this count.
    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GeneratorState {
        if self.abort.is_aborted() {
            GeneratorState::Aborted
        } else {
            self.phase
        }
    }

    /// The axis names of emitted positions, slow axis first.
    pub fn axis_names(&self) -> &[String] {
        &self.names
    }

    /// The model's exposure time, seconds.
    pub fn exposure_time(&self) -> f64 {
        self.exposure
    }

    /// The model this generator walks.
    pub fn model(&self) -> &ScanPathModel {
        &self.model
    }

    /// The regions attached via [`set_regions`](PointGenerator::set_regions).
    pub fn regions(&self) -> &[Roi] {
        &self.regions
    }

    /// Human-readable label, usually from the registry descriptor.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Sets the label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Human-readable description, usually from the registry descriptor.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Replaces the model before iteration has started.
    ///
    /// The replacement is validated and dispatched to its native kernel; the
    /// path, axis names and total count all follow the new model. Fails with
    /// `UnsupportedOperation` once any position has been produced.
    pub fn set_model(&mut self, model: ScanPathModel) -> ScanResult<()> {
        self.require_fresh("set_model after iteration has started")?;
        model.validate()?;
        let kernel = kernel::for_model(&model)?;
        self.names = model.axis_names().into();
        self.exposure = model.exposure_time();
        self.total = kernel.count();
        self.kernel = kernel;
        self.model = model;
        Ok(())
    }

    /// Replaces the position filters before iteration has started.
    ///
    /// Filters are AND-composed: a position is emitted only when every
    /// container accepts it.
    pub fn set_containers(
        &mut self,
        containers: Vec<Box<dyn PointContainer>>,
    ) -> ScanResult<()> {
        self.require_fresh("set_containers after iteration has started")?;
        self.containers = containers;
        Ok(())
    }

    /// Attaches regions of interest before iteration has started.
    ///
    /// Each region is wrapped as a filter over this generator's axes (see
    /// [`RoiContainer`] for the coordinate convention) and the originals are
    /// kept for introspection via [`regions`](PointGenerator::regions).
    pub fn set_regions(&mut self, regions: Vec<Roi>) -> ScanResult<()> {
        self.require_fresh("set_regions after iteration has started")?;
        for roi in &regions {
            self.containers
                .push(Box::new(RoiContainer::new(roi.clone(), &self.names)));
        }
        self.regions.extend(regions);
        Ok(())
    }

    /// Requests cancellation; the iterator ends at its next boundary.
    pub fn abort(&self) {
        self.abort.abort();
    }

    /// A handle that can cancel this generator from another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Whether a next accepted position exists, without consuming it.
    pub fn has_next(&mut self) -> bool {
        if self.abort.is_aborted() {
            return false;
        }
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        self.peeked.is_some()
    }

    /// The checked iteration protocol.
    ///
    /// Yields the next accepted position, `IterationExhausted` after the last
    /// one, or `Aborted` once cancellation has been observed.
    pub fn try_next(&mut self) -> ScanResult<Position> {
        match self.next() {
            Some(position) => Ok(position),
            None if self.abort.is_aborted() => Err(GeneratorError::Aborted),
            None => Err(GeneratorError::IterationExhausted),
        }
    }

    /// Adapts the generator into a boxed position stream.
    pub fn into_stream(self) -> PointStream {
        Box::pin(stream::iter(self))
    }

    // Restart for compound composition; not part of the public single-use
    // contract. The abort flag survives a rewind.
    pub(crate) fn rewind(&mut self) {
        self.cursor = 0;
        self.peeked = None;
        self.phase = GeneratorState::Fresh;
    }

    fn require_fresh(&self, operation: &str) -> ScanResult<()> {
        if self.state() == GeneratorState::Fresh {
            Ok(())
        } else {
            Err(GeneratorError::UnsupportedOperation {
                operation: operation.to_string(),
            })
        }
    }

    fn assemble(&self, ordinal: u64) -> Position {
        let raw = self.kernel.produce(ordinal);
        let exposure = raw.exposure.unwrap_or(self.exposure);
        Position::new(
            Arc::clone(&self.names),
            raw.values,
            raw.indices,
            ordinal,
            exposure,
        )
    }

    fn accepted(&self, position: &Position) -> bool {
        self.containers
            .iter()
            .all(|container| container.contains_position(position))
    }

    // Walks kernel ordinals from the cursor to the next accepted position.
    // Step indices stay the kernel ordinals, so gating leaves a strictly
    // increasing subsequence rather than renumbering.
    fn advance(&mut self) -> Option<Position> {
        while self.cursor < self.total {
            if self.abort.is_aborted() {
                return None;
            }
            let position = self.assemble(self.cursor);
            self.cursor += 1;
            self.phase = GeneratorState::Running;
            if self.accepted(&position) {
                return Some(position);
            }
        }
        self.phase = GeneratorState::Exhausted;
        None
    }
}

impl Iterator for PointGenerator {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.abort.is_aborted() {
            self.peeked = None;
            return None;
        }
        if let Some(position) = self.peeked.take() {
            return Some(position);
        }
        self.advance()
    }
}

impl std::fmt::Debug for PointGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointGenerator")
            .field("kind", &self.model.kind())
            .field("total", &self.total)
            .field("cursor", &self.cursor)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArrayModel, StepModel};

    fn generator(model: ScanPathModel) -> PointGenerator {
        let kernel = kernel::for_model(&model).unwrap();
        PointGenerator::from_parts(model, kernel)
    }

    #[test]
    fn test_walks_a_step_model_densely() {
        let gen = generator(ScanPathModel::Step(StepModel::new("x", 0.0, 10.0, 2.0)));
        assert_eq!(gen.total_count(), 6);
        let positions: Vec<Position> = gen.collect();
        assert_eq!(positions.len(), 6);
        for (i, position) in positions.iter().enumerate() {
            assert_eq!(position.step_index(), i as u64);
            assert_eq!(position.value("x"), Some(i as f64 * 2.0));
        }
    }

    #[test]
    fn test_none_repeats_after_exhaustion() {
        let mut gen = generator(ScanPathModel::Array(ArrayModel::new("x", vec![1.0])));
        assert!(gen.next().is_some());
        assert!(gen.next().is_none());
        assert!(gen.next().is_none());
        assert_eq!(gen.state(), GeneratorState::Exhausted);
    }

    #[test]
    fn test_try_next_distinguishes_exhaustion_from_abort() {
        let mut gen = generator(ScanPathModel::Array(ArrayModel::new("x", vec![1.0])));
        assert!(gen.try_next().is_ok());
        assert!(matches!(
            gen.try_next(),
            Err(GeneratorError::IterationExhausted)
        ));

        let mut gen = generator(ScanPathModel::Array(ArrayModel::new("x", vec![1.0, 2.0])));
        gen.abort();
        assert!(matches!(gen.try_next(), Err(GeneratorError::Aborted)));
        assert_eq!(gen.state(), GeneratorState::Aborted);
    }

    #[test]
    fn test_has_next_peeks_without_consuming() {
        let mut gen = generator(ScanPathModel::Array(ArrayModel::new("x", vec![7.0])));
        assert!(gen.has_next());
        assert!(gen.has_next());
        assert_eq!(gen.next().and_then(|p| p.value("x")), Some(7.0));
        assert!(!gen.has_next());
    }

    #[test]
    fn test_abort_from_handle_stops_iteration_at_the_boundary() {
        let mut gen = generator(ScanPathModel::Step(StepModel::new("x", 0.0, 100.0, 1.0)));
        let handle = gen.abort_handle();
        assert!(gen.next().is_some());
        handle.abort();
        handle.abort(); // idempotent
        assert!(gen.next().is_none());
        assert_eq!(gen.state(), GeneratorState::Aborted);
    }

    #[test]
    fn test_gating_skips_but_keeps_step_indices() {
        let mut gen = generator(ScanPathModel::Step(StepModel::new("x", 0.0, 9.0, 1.0)));
        gen.set_containers(vec![Box::new(|pos: &Position| {
            pos.value("x").is_some_and(|x| (x as i64) % 2 == 0)
        })])
        .unwrap();
        let indices: Vec<u64> = gen.map(|p| p.step_index()).collect();
        assert_eq!(indices, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_gated_out_everything_exhausts_cleanly() {
        let mut gen = generator(ScanPathModel::Step(StepModel::new("x", 0.0, 9.0, 1.0)));
        gen.set_containers(vec![Box::new(|_: &Position| false)]).unwrap();
        assert_eq!(gen.total_count(), 10);
        assert!(!gen.has_next());
        assert_eq!(gen.state(), GeneratorState::Exhausted);
    }

    #[test]
    fn test_set_model_is_rejected_once_running() {
        let mut gen = generator(ScanPathModel::Step(StepModel::new("x", 0.0, 5.0, 1.0)));
        assert!(gen.next().is_some());
        let err = gen
            .set_model(ScanPathModel::Array(ArrayModel::new("x", vec![1.0])))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::UnsupportedOperation { .. }));
    }

    #[test]
    fn test_set_model_replaces_path_while_fresh() {
        let mut gen = generator(ScanPathModel::Step(StepModel::new("x", 0.0, 5.0, 1.0)));
        gen.set_model(ScanPathModel::Array(ArrayModel::new("q", vec![4.0, 2.0])))
            .unwrap();
        assert_eq!(gen.total_count(), 2);
        assert_eq!(gen.axis_names(), ["q".to_string()]);
        let values: Vec<f64> = gen.filter_map(|p| p.value("q")).collect();
        assert_eq!(values, vec![4.0, 2.0]);
    }

    #[test]
    fn test_multi_step_exposure_override_reaches_positions() {
        use crate::models::{MultiStepModel, StepSegment};
        let mut model = MultiStepModel::new(
            "energy",
            vec![
                StepSegment::new(0.0, 1.0, 1.0),
                StepSegment::with_exposure(5.0, 6.0, 1.0, 0.8),
            ],
        );
        model.exposure_time = 0.1;
        let gen = generator(ScanPathModel::MultiStep(model));
        let exposures: Vec<f64> = gen.map(|p| p.exposure_time()).collect();
        assert_eq!(exposures, vec![0.1, 0.1, 0.8, 0.8]);
    }

    #[test]
    fn test_rewind_replays_the_same_sequence() {
        let mut gen = generator(ScanPathModel::Step(StepModel::new("x", 0.0, 4.0, 1.0)));
        let first: Vec<f64> = gen.by_ref().filter_map(|p| p.value("x")).collect();
        gen.rewind();
        let second: Vec<f64> = gen.filter_map(|p| p.value("x")).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stream_adapter_yields_every_position() {
        let gen = generator(ScanPathModel::Step(StepModel::new("x", 0.0, 4.0, 1.0)));
        let stream = gen.into_stream();
        let positions = futures::executor::block_on(futures::StreamExt::collect::<Vec<_>>(stream));
        assert_eq!(positions.len(), 5);
    }
}
