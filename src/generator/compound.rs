//! Odometer composition of point generators.

use std::sync::Arc;

use futures::stream;

use crate::error::{GeneratorError, ScanResult};
use crate::position::Position;

use super::{AbortHandle, GeneratorState, PointGenerator, PointStream};

/// Cartesian product of inner generators, outermost first, the last one
/// iterating fastest.
///
/// The compound walks its inners like an odometer: every tick of an outer
/// generator restarts everything inside it. Positions carry the concatenated
/// axes of all inners and the exposure of the innermost one. The step index
/// is the flat odometer index over the inners' ungated paths, so per-inner
/// region gating thins the product without renumbering what remains.
///
/// The iteration protocol (`Iterator`, `has_next`, `try_next`, abort,
/// [`into_stream`](CompoundGenerator::into_stream)) matches
/// [`PointGenerator`].
pub struct CompoundGenerator {
    inners: Vec<PointGenerator>,
    names: Arc<[String]>,
    strides: Vec<u64>,
    total: u64,
    digits: Vec<Position>,
    peeked: Option<Position>,
    phase: GeneratorState,
    abort: AbortHandle,
}

impl CompoundGenerator {
    /// Composes fresh inner generators, outermost first.
    ///
    /// Fails with `InvalidModel` when `inners` is empty, `AxisCollision` when
    /// two inners drive the same axis, and `UnsupportedOperation` when an
    /// inner has already produced positions.
    pub fn new(inners: Vec<PointGenerator>) -> ScanResult<Self> {
        if inners.is_empty() {
            return Err(GeneratorError::invalid(
                "compound",
                "at least one inner generator is required",
            ));
        }
        let mut names: Vec<String> = Vec::new();
        for inner in &inners {
            if inner.state() != GeneratorState::Fresh {
                return Err(GeneratorError::UnsupportedOperation {
                    operation: format!(
                        "compose a generator that is already {}",
                        inner.state()
                    ),
                });
            }
            for axis in inner.axis_names() {
                if names.contains(axis) {
                    return Err(GeneratorError::AxisCollision { axis: axis.clone() });
                }
                names.push(axis.clone());
            }
        }

        // Row-major strides over the ungated totals: the last inner advances
        // the flat index by one.
        let mut strides = vec![1u64; inners.len()];
        for i in (0..inners.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1].saturating_mul(inners[i + 1].total_count());
        }
        let total = strides[0].saturating_mul(inners[0].total_count());

        Ok(Self {
            inners,
            names: names.into(),
            strides,
            total,
            digits: Vec::new(),
            peeked: None,
            phase: GeneratorState::Fresh,
            abort: AbortHandle::new(),
        })
    }

    /// Product of the inners' ungated totals.
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

    /// The concatenated axis names, outermost inner first.
    pub fn axis_names(&self) -> &[String] {
        &self.names
    }

    /// The innermost generator's exposure time, seconds.
    pub fn exposure_time(&self) -> f64 {
        self.inners.last().map(|g| g.exposure_time()).unwrap_or(0.0)
    }

    /// The inner generators, outermost first.
    pub fn inner_generators(&self) -> &[PointGenerator] {
        &self.inners
    }

    /// Requests cancellation; the iterator ends at its next boundary.
    pub fn abort(&self) {
        self.abort.abort();
    }

    /// A handle that can cancel this generator from another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Whether a next position exists, without consuming it.
    pub fn has_next(&mut self) -> bool {
        if self.abort.is_aborted() {
            return false;
        }
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        self.peeked.is_some()
    }

    /// The checked iteration protocol; see
    /// [`PointGenerator::try_next`](super::PointGenerator::try_next).
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

    fn combined(&self) -> Position {
        let axes = self.names.len();
        let mut values = Vec::with_capacity(axes);
        let mut indices = Vec::with_capacity(axes);
        let mut step_index = 0u64;
        for (digit, stride) in self.digits.iter().zip(&self.strides) {
            values.extend_from_slice(digit.values());
            indices.extend_from_slice(digit.indices());
            step_index = step_index.saturating_add(digit.step_index().saturating_mul(*stride));
        }
        let exposure = self
            .digits
            .last()
            .map(|digit| digit.exposure_time())
            .unwrap_or(0.0);
        Position::new(
            Arc::clone(&self.names),
            values,
            indices,
            step_index,
            exposure,
        )
    }

    fn advance(&mut self) -> Option<Position> {
        if self.abort.is_aborted() || self.phase == GeneratorState::Exhausted {
            return None;
        }

        if self.digits.is_empty() {
            // First tick: pull the opening position of every inner. An inner
            // whose gated path is empty empties the whole product.
            let mut digits = Vec::with_capacity(self.inners.len());
            for inner in &mut self.inners {
                match inner.next() {
                    Some(position) => digits.push(position),
                    None => {
                        self.phase = GeneratorState::Exhausted;
                        return None;
                    }
                }
            }
            self.digits = digits;
            self.phase = GeneratorState::Running;
            return Some(self.combined());
        }

        // Carry from the fastest digit outwards.
        let mut level = self.inners.len() - 1;
        loop {
            if let Some(position) = self.inners[level].next() {
                self.digits[level] = position;
                break;
            }
            if level == 0 {
                self.phase = GeneratorState::Exhausted;
                return None;
            }
            self.inners[level].rewind();
            match self.inners[level].next() {
                Some(position) => self.digits[level] = position,
                None => {
                    self.phase = GeneratorState::Exhausted;
                    return None;
                }
            }
            level -= 1;
        }
        Some(self.combined())
    }
}

impl Iterator for CompoundGenerator {
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

impl std::fmt::Debug for CompoundGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompoundGenerator")
            .field("inners", &self.inners.len())
            .field("axes", &self.names)
            .field("total", &self.total)
            .field("state", &self.state())
            .finish()
    }
}
