//! Error types for the point generation service.
//!
//! This module defines the primary error type, `GeneratorError`, for the entire
//! crate. Using the `thiserror` crate, it provides a centralized and consistent
//! way to handle the failure modes of model validation, registry dispatch, and
//! iteration.
//!
//! ## Error categories
//!
//! - **Construction**: `UnknownModelKind`, `UnknownGeneratorId`,
//!   `InvalidModel` and `ConstructionFailed` are surfaced by
//!   [`GeneratorRegistry::create_generator`](crate::registry::GeneratorRegistry)
//!   and friends before any position is produced.
//! - **Composition**: `AxisCollision` is raised when a compound generator is
//!   built from inner generators whose axis names overlap.
//! - **Iteration**: `IterationExhausted` and `Aborted` come out of the checked
//!   [`try_next`](crate::generator::PointGenerator::try_next) protocol;
//!   `UnsupportedOperation` covers calls that are illegal for the generator's
//!   current state (for example `set_model` after iteration has started).
//!
//! Errors carry the model kind or descriptor id where one is available, so a
//! failure can be traced back to the scan description that produced it.

use thiserror::Error;

use crate::models::ModelKind;

/// Convenience alias for results using the crate error type.
pub type ScanResult<T> = std::result::Result<T, GeneratorError>;

/// Errors produced while building or running point generators.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// No generator constructor is registered for the model's kind.
    #[error("no generator registered for model kind '{kind}'")]
    UnknownModelKind {
        /// The kind that failed dispatch.
        kind: ModelKind,
    },

    /// No descriptor is registered under the requested id.
    #[error("no generator registered with id '{id}'")]
    UnknownGeneratorId {
        /// The id that was looked up.
        id: String,
    },

    /// The model is malformed or carries out-of-range fields.
    #[error("invalid {model} model: {reason}")]
    InvalidModel {
        /// Kind or id of the offending model.
        model: String,
        /// Human-readable description of the violation.
        reason: String,
    },

    /// Two inner generators of a compound drive the same axis.
    #[error("axis '{axis}' is driven by more than one generator in the compound")]
    AxisCollision {
        /// The duplicated axis name.
        axis: String,
    },

    /// `try_next` was called after the generator terminated.
    #[error("point iterator is exhausted")]
    IterationExhausted,

    /// The operation is not legal for the generator's current state.
    #[error("unsupported operation: {operation}")]
    UnsupportedOperation {
        /// What was attempted.
        operation: String,
    },

    /// Generator construction failed in an underlying constructor or source.
    #[error("could not construct generator for '{model}': {source}")]
    ConstructionFailed {
        /// Kind, id, or source name the construction was for.
        model: String,
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// The generator was cancelled via its abort handle.
    #[error("scan was aborted")]
    Aborted,
}

impl GeneratorError {
    /// Shorthand for a [`GeneratorError::InvalidModel`] with formatted context.
    pub fn invalid(model: impl Into<String>, reason: impl Into<String>) -> Self {
        GeneratorError::InvalidModel {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for wrapping an underlying error in
    /// [`GeneratorError::ConstructionFailed`].
    pub fn construction(model: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        GeneratorError::ConstructionFailed {
            model: model.into(),
            source: source.into(),
        }
    }
}
