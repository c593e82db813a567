//! # Scangen
//!
//! This crate is a scan-path point generation service for raster-style
//! experiments: it turns declarative scan-path models (grids, lines, spirals,
//! step ranges and friends) into deterministic, lazily evaluated sequences of
//! scan positions. Models are plain serde data, so paths can arrive over the
//! wire, live in YAML descriptor files, or be built in code; the generators
//! they produce are plain iterators that can be stepped, peeked, aborted and
//! composed into multi-dimensional products.
//!
//! ## Crate Structure
//!
//! The library is organized into several modules, each with a distinct
//! responsibility:
//!
//! - **`models`**: The scan-path model types, one per path kind, plus the
//!   tagged [`ScanPathModel`](models::ScanPathModel) enum they serialize
//!   through and the compound model for multi-dimensional scans.
//! - **`kernel`**: The pure per-kind point arithmetic. A
//!   [`PathKernel`](kernel::PathKernel) maps an ordinal to raw coordinates
//!   and knows nothing about iteration state or filtering.
//! - **`generator`**: [`PointGenerator`](generator::PointGenerator), the
//!   stateful iterator over a kernel with peeking, abort and region gating,
//!   and [`CompoundGenerator`](generator::CompoundGenerator), the odometer
//!   product of several generators.
//! - **`position`**: The [`Position`](position::Position) point type emitted
//!   by every generator.
//! - **`region`**: Regions of interest and the position filters that gate
//!   generators to them.
//! - **`registry`**: Model-to-generator dispatch. Built once from the native
//!   kinds plus discovered descriptors, then shared.
//! - **`discovery`**: Descriptor sources for the registry's extension phase,
//!   including the YAML directory source.
//! - **`config`**: Service configuration loaded via `figment` from TOML and
//!   `SCANGEN_` environment variables.
//! - **`logging`**: `tracing` subscriber initialisation helpers.
//! - **`error`**: The [`GeneratorError`](error::GeneratorError) enum for
//!   centralized error handling across the service.
//!
//! ## Example
//!
//! ```
//! use scangen::models::{BoundingBox, GridModel, ScanPathModel};
//! use scangen::registry::RegistryBuilder;
//!
//! # fn main() -> scangen::error::ScanResult<()> {
//! let registry = RegistryBuilder::with_builtins().build();
//!
//! let model = ScanPathModel::Grid(GridModel::new(
//!     "x",
//!     "y",
//!     3,
//!     2,
//!     BoundingBox::new(0.0, 0.0, 3.0, 2.0),
//! ));
//! let generator = registry.create_generator(&model)?;
//! assert_eq!(generator.total_count(), 6);
//!
//! for position in generator {
//!     println!("{position}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod generator;
pub mod kernel;
pub mod logging;
pub mod models;
pub mod position;
pub mod region;
pub mod registry;

pub use error::{GeneratorError, ScanResult};
pub use generator::{AbortHandle, CompoundGenerator, GeneratorState, PointGenerator, PointStream};
pub use kernel::{PathKernel, RawPoint};
pub use models::{CompoundModel, ModelKind, ScanPathModel};
pub use position::Position;
pub use region::{PointContainer, Roi, RoiContainer, ScanRegion};
pub use registry::{GeneratorDescriptor, GeneratorRegistry, RegistryBuilder};
