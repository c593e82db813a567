//! Compound scans: an ordered list of inner models plus the scan regions
//! that gate them.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, ScanResult};
use crate::region::ScanRegion;

use super::ScanPathModel;

/// An ordered composition of scan models, outermost first.
///
/// The composed scan is the cartesian product of the inner paths with the
/// last model iterating fastest. Regions are routed to the inner models they
/// constrain by axis name before the product is formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundModel {
    /// The inner models, outermost (slowest) first.
    pub models: Vec<ScanPathModel>,
    /// Regions of interest bound to the axes they constrain.
    #[serde(default)]
    pub regions: Vec<ScanRegion>,
}

impl CompoundModel {
    /// Builds a compound over `models` with no regions.
    pub fn new(models: Vec<ScanPathModel>) -> Self {
        Self {
            models,
            regions: Vec::new(),
        }
    }

    /// Adds an inner model after the existing ones (it becomes the fastest).
    pub fn push_model(&mut self, model: ScanPathModel) {
        self.models.push(model);
    }

    /// Adds a scan region.
    pub fn push_region(&mut self, region: ScanRegion) {
        self.regions.push(region);
    }

    pub(crate) fn validate(&self) -> ScanResult<()> {
        if self.models.is_empty() {
            return Err(GeneratorError::invalid(
                "compound",
                "at least one inner model is required",
            ));
        }
        Ok(())
    }
}

/// Decides whether a scan region constrains a model with the given axes.
///
/// A region applies when its scannable list is empty (constrains everything),
/// names a superset of the model's axes, or matches every axis through the
/// data-path form `/entry/<anything>/<axis>_value_set`.
pub(crate) fn region_applies(region: &ScanRegion, axes: &[String]) -> bool {
    if region.scannables.is_empty() {
        return true;
    }
    if axes.iter().all(|axis| region.scannables.contains(axis)) {
        return true;
    }
    axes.iter().all(|axis| {
        let pattern = format!("^/entry/.+/{}_value_set$", regex::escape(axis));
        Regex::new(&pattern).map_or(false, |re| {
            region.scannables.iter().any(|name| re.is_match(name))
        })
    })
}
