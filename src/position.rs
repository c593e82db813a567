//! Scan positions: the named coordinate tuples a generator emits.
//!
//! A [`Position`] is an ordered mapping from axis name to a real value, plus a
//! per-axis grid index, a global step index and an exposure time. Positions are
//! immutable once published by a generator; consumers read them, they never
//! write them back.
//!
//! On the wire a position is an aligned triple of lists (`names`, `values`,
//! `indices`) together with `stepIndex` and `exposureTime`. The axis-name list
//! is shared between every position of one iteration (`Arc<[String]>`), so the
//! per-point allocation stays proportional to the number of axes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Per-axis index value used when a position is not grid-indexed.
pub const UNINDEXED: i64 = -1;

/// A single point of a scan path.
///
/// The axis-name ordering is significant: it is fixed when the generator is
/// constructed and every aligned list (`values`, `indices`) follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    names: Arc<[String]>,
    values: Vec<f64>,
    indices: Vec<i64>,
    step_index: u64,
    exposure_time: f64,
}

impl Position {
    /// Builds a position from aligned parts.
    ///
    /// `names`, `values` and `indices` must have equal lengths; generators
    /// uphold this by construction.
    pub fn new(
        names: Arc<[String]>,
        values: Vec<f64>,
        indices: Vec<i64>,
        step_index: u64,
        exposure_time: f64,
    ) -> Self {
        debug_assert_eq!(names.len(), values.len());
        debug_assert_eq!(names.len(), indices.len());
        Self {
            names,
            values,
            indices,
            step_index,
            exposure_time,
        }
    }

    /// The ordered axis names of this position.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Shared handle to the axis-name list.
    pub(crate) fn names_arc(&self) -> Arc<[String]> {
        Arc::clone(&self.names)
    }

    /// The values, ordered as [`names`](Self::names).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The per-axis grid indices, ordered as [`names`](Self::names).
    ///
    /// An entry is [`UNINDEXED`] when the axis does not advance on a grid
    /// (collated axes, for example).
    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    /// Value of the named axis, or `None` if this position does not drive it.
    pub fn value(&self, axis: &str) -> Option<f64> {
        self.axis_offset(axis).map(|i| self.values[i])
    }

    /// Grid index of the named axis, or `None` if this position does not
    /// drive it.
    pub fn index(&self, axis: &str) -> Option<i64> {
        self.axis_offset(axis).map(|i| self.indices[i])
    }

    /// Monotonic index of this position within its iteration.
    ///
    /// Region gating skips positions without renumbering the survivors, so the
    /// step indices a consumer observes may be a sparse subsequence.
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    /// Exposure time in seconds requested for this position. Usually 0.
    pub fn exposure_time(&self) -> f64 {
        self.exposure_time
    }

    /// Number of axes this position drives.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True for axis-less positions (static scans used as frame counters).
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates `(axis, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    fn axis_offset(&self, axis: &str) -> Option<usize> {
        // Axis counts are tiny; a linear scan beats a map here.
        self.names.iter().position(|n| n == axis)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.step_index)?;
        if self.is_empty() {
            return write!(f, " (static)");
        }
        for (i, (name, value)) in self.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}
