//! Model-to-generator dispatch.
//!
//! The registry is built once, in two phases, and is immutable afterwards:
//!
//! 1. the **static phase** seeds a factory for every native model kind plus
//!    one descriptor per kind under the id `scangen.<kind>`;
//! 2. the **extension phase** pulls further descriptors from
//!    [`DescriptorSource`]s, for example YAML files in a configured
//!    directory.
//!
//! A *factory* turns a validated model into its
//! [`PathKernel`](crate::kernel::PathKernel); each model kind has exactly one
//! (a second registration for a claimed kind is refused). A *descriptor* is a
//! named, labelled default model; duplicate descriptor ids overwrite, last
//! writer wins.
//!
//! ```no_run
//! use scangen::models::{ScanPathModel, StepModel};
//! use scangen::registry::RegistryBuilder;
//!
//! let registry = RegistryBuilder::with_builtins().build();
//! let model = ScanPathModel::Step(StepModel::new("x", 0.0, 10.0, 2.0));
//! let generator = registry.create_generator(&model)?;
//! for position in generator {
//!     println!("{position}");
//! }
//! # Ok::<(), scangen::error::GeneratorError>(())
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::discovery::{DescriptorSource, YamlDescriptorSource};
use crate::error::{GeneratorError, ScanResult};
use crate::generator::{CompoundGenerator, PointGenerator};
use crate::kernel::{self, PathKernel};
use crate::models::bounds::{BoundingBox, BoundingLine};
use crate::models::{region_applies, CompoundModel, ModelKind, ScanPathModel};
use crate::region::{Roi, ScanRegion};

/// Builds the kernel for a validated model of one registered kind.
pub type GeneratorFactory =
    Arc<dyn Fn(&ScanPathModel) -> ScanResult<Box<dyn PathKernel>> + Send + Sync>;

/// A named, creatable entry of the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorDescriptor {
    /// Unique id, e.g. `scangen.grid` for the builtin grid entry.
    pub id: String,
    /// The model kind this entry creates.
    pub kind: ModelKind,
    /// Short human-readable name.
    pub label: Option<String>,
    /// Longer human-readable description.
    pub description: Option<String>,
}

struct DescriptorEntry {
    descriptor: GeneratorDescriptor,
    default_model: ScanPathModel,
}

// ============================================================================
// Builder
// ============================================================================

/// Two-phase construction of a [`GeneratorRegistry`].
pub struct RegistryBuilder {
    factories: HashMap<ModelKind, GeneratorFactory>,
    entries: BTreeMap<String, DescriptorEntry>,
}

impl RegistryBuilder {
    /// An empty builder with no factories and no descriptors.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            entries: BTreeMap::new(),
        }
    }

    /// A builder pre-seeded with the native kernels for every model kind and
    /// one `scangen.<kind>` descriptor per kind.
    pub fn with_builtins() -> Self {
        let mut builder = Self::new();
        for kind in ModelKind::ALL {
            let factory: GeneratorFactory = Arc::new(kernel::for_model);
            builder.factories.insert(kind, factory);
            let descriptor = GeneratorDescriptor {
                id: format!("scangen.{kind}"),
                kind,
                label: Some(builtin_label(kind).to_string()),
                description: None,
            };
            builder.entries.insert(
                descriptor.id.clone(),
                DescriptorEntry {
                    descriptor,
                    default_model: ScanPathModel::default_for(kind),
                },
            );
        }
        builder
    }

    /// Registers a generator factory for a model kind.
    ///
    /// Each kind has at most one factory; registering a second one fails with
    /// `ConstructionFailed`.
    pub fn register_kind<F>(&mut self, kind: ModelKind, factory: F) -> ScanResult<()>
    where
        F: Fn(&ScanPathModel) -> ScanResult<Box<dyn PathKernel>> + Send + Sync + 'static,
    {
        if self.factories.contains_key(&kind) {
            return Err(GeneratorError::construction(
                kind.as_str(),
                anyhow::anyhow!("a generator factory for kind '{kind}' is already registered"),
            ));
        }
        self.factories.insert(kind, Arc::new(factory));
        Ok(())
    }

    /// Registers a descriptor with its default model.
    ///
    /// The default model must validate and match the descriptor's kind. A
    /// duplicate id overwrites the previous entry.
    pub fn register_descriptor(
        &mut self,
        descriptor: GeneratorDescriptor,
        default_model: ScanPathModel,
    ) -> ScanResult<()> {
        if descriptor.id.is_empty() {
            return Err(GeneratorError::construction(
                "descriptor",
                anyhow::anyhow!("descriptor id must not be empty"),
            ));
        }
        if descriptor.kind != default_model.kind() {
            return Err(GeneratorError::construction(
                descriptor.id.clone(),
                anyhow::anyhow!(
                    "descriptor kind '{}' does not match default model kind '{}'",
                    descriptor.kind,
                    default_model.kind()
                ),
            ));
        }
        default_model.validate()?;
        if self.entries.contains_key(&descriptor.id) {
            debug!("descriptor '{}' overwritten", descriptor.id);
        }
        self.entries.insert(
            descriptor.id.clone(),
            DescriptorEntry {
                descriptor,
                default_model,
            },
        );
        Ok(())
    }

    /// Pulls descriptors from a source, the extension phase.
    ///
    /// A failing source aborts the load with `ConstructionFailed`; individual
    /// unusable descriptors (empty id, unregistered kind, invalid default
    /// model) are logged and skipped.
    pub fn load_source(&mut self, source: &dyn DescriptorSource) -> ScanResult<()> {
        let discovered = source
            .descriptors()
            .map_err(|e| GeneratorError::construction(source.name(), e))?;
        for entry in discovered {
            if entry.id.is_empty() {
                warn!("skipping descriptor with empty id from '{}'", source.name());
                continue;
            }
            let kind = entry.model.kind();
            if !self.factories.contains_key(&kind) {
                warn!(
                    "skipping descriptor '{}': no factory for kind '{}'",
                    entry.id, kind
                );
                continue;
            }
            if let Err(error) = entry.model.validate() {
                warn!(
                    "skipping descriptor '{}': invalid default model: {}",
                    entry.id, error
                );
                continue;
            }
            if self.entries.contains_key(&entry.id) {
                debug!("descriptor '{}' overwritten by '{}'", entry.id, source.name());
            }
            self.entries.insert(
                entry.id.clone(),
                DescriptorEntry {
                    descriptor: GeneratorDescriptor {
                        id: entry.id,
                        kind,
                        label: entry.label,
                        description: entry.description,
                    },
                    default_model: entry.model,
                },
            );
        }
        Ok(())
    }

    /// Finalises the registry.
    pub fn build(self) -> GeneratorRegistry {
        info!(
            "generator registry built: {} kinds, {} descriptors",
            self.factories.len(),
            self.entries.len()
        );
        GeneratorRegistry {
            factories: self.factories,
            entries: self.entries,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_label(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::Step => "Step",
        ModelKind::CollatedStep => "Collated step",
        ModelKind::MultiStep => "Multi-step",
        ModelKind::Array => "Array",
        ModelKind::RepeatedPoint => "Repeated point",
        ModelKind::Static => "Static",
        ModelKind::Grid => "Grid",
        ModelKind::Raster => "Raster",
        ModelKind::RandomOffsetGrid => "Random-offset grid",
        ModelKind::OneDEqualSpacing => "Equal-spacing line",
        ModelKind::OneDStep => "Stepped line",
        ModelKind::Spiral => "Spiral",
        ModelKind::Lissajous => "Lissajous",
    }
}

// ============================================================================
// Registry
// ============================================================================

/// The built, immutable dispatch table. Safe to share across threads.
pub struct GeneratorRegistry {
    factories: HashMap<ModelKind, GeneratorFactory>,
    entries: BTreeMap<String, DescriptorEntry>,
}

impl GeneratorRegistry {
    /// Builds a registry from configuration: builtins plus, when a descriptor
    /// directory is configured, a YAML source over it.
    pub fn from_config(config: &ServiceConfig) -> ScanResult<GeneratorRegistry> {
        let mut builder = RegistryBuilder::with_builtins();
        if let Some(dir) = &config.descriptor_dir {
            let source = YamlDescriptorSource::new(dir).strict(config.strict_discovery);
            builder.load_source(&source)?;
        }
        Ok(builder.build())
    }

    /// Validates the model and builds its generator.
    pub fn create_generator(&self, model: &ScanPathModel) -> ScanResult<PointGenerator> {
        model.validate()?;
        let factory = self
            .factories
            .get(&model.kind())
            .ok_or(GeneratorError::UnknownModelKind { kind: model.kind() })?;
        let kernel = factory(model)?;
        Ok(PointGenerator::from_parts(model.clone(), kernel))
    }

    /// Builds a generator gated by regions of interest.
    ///
    /// The regions' bounds are folded into the model's bounding shape first
    /// (see the crate docs on bounding inference), then attached as position
    /// filters.
    pub fn create_generator_with_regions(
        &self,
        model: &ScanPathModel,
        regions: Vec<Roi>,
    ) -> ScanResult<PointGenerator> {
        let mut bounded = model.clone();
        set_bounds(&mut bounded, &regions)?;
        let mut generator = self.create_generator(&bounded)?;
        generator.set_regions(regions)?;
        Ok(generator)
    }

    /// Builds a generator from a registered descriptor id and its default
    /// model, carrying the descriptor's label and description.
    pub fn create_by_id(&self, id: &str) -> ScanResult<PointGenerator> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| GeneratorError::UnknownGeneratorId { id: id.to_string() })?;
        let mut generator = self.create_generator(&entry.default_model)?;
        if let Some(label) = &entry.descriptor.label {
            generator.set_label(label.clone());
        }
        if let Some(description) = &entry.descriptor.description {
            generator.set_description(description.clone());
        }
        Ok(generator)
    }

    /// Builds the odometer composition of a compound model, routing each scan
    /// region to the inner models it constrains.
    pub fn create_compound(&self, compound: &CompoundModel) -> ScanResult<CompoundGenerator> {
        compound.validate()?;
        let mut inners = Vec::with_capacity(compound.models.len());
        for model in &compound.models {
            let rois = self.find_regions(model, &compound.regions);
            inners.push(self.create_generator_with_regions(model, rois)?);
        }
        CompoundGenerator::new(inners)
    }

    /// Composes already-built fresh generators, outermost first.
    pub fn compound_from_generators(
        &self,
        inners: Vec<PointGenerator>,
    ) -> ScanResult<CompoundGenerator> {
        CompoundGenerator::new(inners)
    }

    /// The ROIs of every scan region that constrains `model`, in region
    /// order. See [`ScanRegion`] for the matching rules.
    pub fn find_regions(&self, model: &ScanPathModel, regions: &[ScanRegion]) -> Vec<Roi> {
        let axes = model.axis_names();
        let mut rois = Vec::new();
        for region in regions {
            if region_applies(region, &axes) {
                rois.extend(region.rois.iter().cloned());
            }
        }
        rois
    }

    /// All registered descriptor ids, sorted.
    pub fn registered_ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// The descriptor registered under `id`.
    pub fn descriptor(&self, id: &str) -> Option<&GeneratorDescriptor> {
        self.entries.get(id).map(|entry| &entry.descriptor)
    }

    /// All model kinds with a registered factory, sorted.
    pub fn registered_kinds(&self) -> Vec<ModelKind> {
        let mut kinds: Vec<ModelKind> = self.factories.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("kinds", &self.factories.len())
            .field("descriptors", &self.entries.len())
            .finish()
    }
}

// ============================================================================
// Bounding inference
// ============================================================================

/// Folds the bounds of `regions` into the model's bounding shape.
///
/// Box-bounded models get the union of all region bounds, further unioned
/// with any box already on the model, so inference never shrinks an explicit
/// box. Line-bounded models take the first linear region verbatim; with no
/// linear region present the model cannot be bounded and the call fails.
/// Models without a bounding shape are left untouched.
pub(crate) fn set_bounds(model: &mut ScanPathModel, regions: &[Roi]) -> ScanResult<()> {
    if regions.is_empty() {
        return Ok(());
    }
    if model.is_box_bounded() {
        let mut union: Option<BoundingBox> = model.bounding_box().copied();
        for roi in regions {
            let bounds = roi.bounds();
            union = Some(match union {
                Some(current) => current.union(&bounds),
                None => bounds,
            });
        }
        if let Some(bounding_box) = union {
            model.set_bounding_box(bounding_box)?;
        }
    } else if model.is_line_bounded() {
        let line = regions.iter().find_map(|roi| match roi {
            Roi::Linear {
                x_start,
                y_start,
                length,
                angle,
            } => Some(BoundingLine::new(*x_start, *y_start, *length, *angle)),
            _ => None,
        });
        match line {
            Some(line) => model.set_bounding_line(line)?,
            None => {
                return Err(GeneratorError::invalid(
                    model.kind().as_str(),
                    "no linear region to bound the line model",
                ))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GridModel, OneDEqualSpacingModel, StaticModel, StepModel};

    fn registry() -> GeneratorRegistry {
        RegistryBuilder::with_builtins().build()
    }

    #[test]
    fn test_builtins_create_every_kind() {
        let registry = registry();
        for kind in ModelKind::ALL {
            let model = ScanPathModel::default_for(kind);
            let generator = registry.create_generator(&model).unwrap();
            assert_eq!(generator.model().kind(), kind);
        }
        assert_eq!(registry.registered_kinds(), {
            let mut kinds = ModelKind::ALL.to_vec();
            kinds.sort();
            kinds
        });
    }

    #[test]
    fn test_unknown_kind_fails_dispatch() {
        let registry = RegistryBuilder::new().build();
        let model = ScanPathModel::Step(StepModel::default());
        let err = registry.create_generator(&model).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::UnknownModelKind {
                kind: ModelKind::Step
            }
        ));
    }

    #[test]
    fn test_invalid_model_is_rejected_before_dispatch() {
        let registry = registry();
        let model = ScanPathModel::Step(StepModel::new("x", 0.0, 10.0, -1.0));
        assert!(matches!(
            registry.create_generator(&model),
            Err(GeneratorError::InvalidModel { .. })
        ));
    }

    #[test]
    fn test_second_factory_for_a_kind_is_refused() {
        let mut builder = RegistryBuilder::with_builtins();
        let err = builder
            .register_kind(ModelKind::Step, kernel::for_model)
            .unwrap_err();
        assert!(matches!(err, GeneratorError::ConstructionFailed { .. }));
    }

    #[test]
    fn test_custom_factory_on_an_empty_builder_works() {
        let mut builder = RegistryBuilder::new();
        builder
            .register_kind(ModelKind::Static, kernel::for_model)
            .unwrap();
        let registry = builder.build();
        let generator = registry
            .create_generator(&ScanPathModel::Static(StaticModel::new(4)))
            .unwrap();
        assert_eq!(generator.total_count(), 4);
    }

    #[test]
    fn test_create_by_id_uses_the_default_model_and_label() {
        let registry = registry();
        let generator = registry.create_by_id("scangen.static").unwrap();
        assert_eq!(generator.model().kind(), ModelKind::Static);
        assert_eq!(generator.label(), Some("Static"));

        let err = registry.create_by_id("no.such.id").unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownGeneratorId { id } if id == "no.such.id"));
    }

    #[test]
    fn test_registered_ids_are_sorted_and_complete() {
        let registry = registry();
        let ids = registry.registered_ids();
        assert_eq!(ids.len(), ModelKind::ALL.len());
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(ids.contains(&"scangen.grid".to_string()));
    }

    #[test]
    fn test_duplicate_descriptor_id_overwrites() {
        let mut builder = RegistryBuilder::with_builtins();
        builder
            .register_descriptor(
                GeneratorDescriptor {
                    id: "scangen.static".into(),
                    kind: ModelKind::Static,
                    label: Some("Five frames".into()),
                    description: None,
                },
                ScanPathModel::Static(StaticModel::new(5)),
            )
            .unwrap();
        let registry = builder.build();
        let generator = registry.create_by_id("scangen.static").unwrap();
        assert_eq!(generator.total_count(), 5);
        assert_eq!(generator.label(), Some("Five frames"));
    }

    #[test]
    fn test_empty_descriptor_id_is_refused() {
        let mut builder = RegistryBuilder::with_builtins();
        let err = builder
            .register_descriptor(
                GeneratorDescriptor {
                    id: String::new(),
                    kind: ModelKind::Static,
                    label: None,
                    description: None,
                },
                ScanPathModel::Static(StaticModel::new(1)),
            )
            .unwrap_err();
        assert!(matches!(err, GeneratorError::ConstructionFailed { .. }));
    }

    #[test]
    fn test_mismatched_descriptor_kind_is_refused() {
        let mut builder = RegistryBuilder::with_builtins();
        let err = builder
            .register_descriptor(
                GeneratorDescriptor {
                    id: "custom.grid".into(),
                    kind: ModelKind::Grid,
                    label: None,
                    description: None,
                },
                ScanPathModel::Static(StaticModel::new(1)),
            )
            .unwrap_err();
        assert!(matches!(err, GeneratorError::ConstructionFailed { .. }));
    }

    #[test]
    fn test_set_bounds_unions_regions_and_existing_box() {
        let mut model = ScanPathModel::Grid(GridModel::new(
            "x",
            "y",
            2,
            2,
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
        ));
        set_bounds(
            &mut model,
            &[
                Roi::rectangular(2.0, 0.0, 2.0, 1.0),
                Roi::rectangular(0.0, 2.0, 1.0, 2.0),
            ],
        )
        .unwrap();
        // Union spans the original box and both regions.
        assert_eq!(
            model.bounding_box().copied().unwrap(),
            BoundingBox::new(0.0, 0.0, 4.0, 4.0)
        );
    }

    #[test]
    fn test_set_bounds_fills_a_missing_box() {
        let mut model = ScanPathModel::Grid(GridModel {
            bounding_box: None,
            ..GridModel::default()
        });
        set_bounds(&mut model, &[Roi::elliptical(0.0, 0.0, 2.0, 1.0)]).unwrap();
        assert_eq!(
            model.bounding_box().copied().unwrap(),
            BoundingBox::new(-2.0, -1.0, 4.0, 2.0)
        );
    }

    #[test]
    fn test_set_bounds_takes_the_first_linear_region_for_lines() {
        let mut model = ScanPathModel::OneDEqualSpacing(OneDEqualSpacingModel {
            bounding_line: None,
            ..OneDEqualSpacingModel::default()
        });
        set_bounds(
            &mut model,
            &[
                Roi::rectangular(0.0, 0.0, 1.0, 1.0),
                Roi::linear(1.0, 1.0, 5.0, 0.0),
                Roi::linear(9.0, 9.0, 1.0, 0.0),
            ],
        )
        .unwrap();
        let line = model.bounding_line().copied().unwrap();
        assert_eq!((line.x_start, line.y_start, line.length), (1.0, 1.0, 5.0));
    }

    #[test]
    fn test_set_bounds_without_linear_region_fails_for_lines() {
        let mut model = ScanPathModel::OneDEqualSpacing(OneDEqualSpacingModel {
            bounding_line: None,
            ..OneDEqualSpacingModel::default()
        });
        let err = set_bounds(&mut model, &[Roi::rectangular(0.0, 0.0, 1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidModel { .. }));
    }

    #[test]
    fn test_set_bounds_leaves_step_models_alone() {
        let mut model = ScanPathModel::Step(StepModel::default());
        set_bounds(&mut model, &[Roi::rectangular(0.0, 0.0, 1.0, 1.0)]).unwrap();
        assert_eq!(model, ScanPathModel::Step(StepModel::default()));
    }

    #[test]
    fn test_with_regions_infers_box_and_gates() {
        let registry = registry();
        let model = ScanPathModel::Grid(GridModel {
            bounding_box: None,
            fast_count: 4,
            slow_count: 4,
            ..GridModel::default()
        });
        let generator = registry
            .create_generator_with_regions(&model, vec![Roi::rectangular(0.0, 0.0, 4.0, 4.0)])
            .unwrap();
        assert_eq!(generator.regions().len(), 1);
        assert_eq!(
            generator.model().bounding_box().copied().unwrap(),
            BoundingBox::new(0.0, 0.0, 4.0, 4.0)
        );
        // The whole grid sits inside the region, so nothing is gated away.
        assert_eq!(generator.count(), 16);
    }

    #[test]
    fn test_find_regions_routes_by_scannables() {
        let registry = registry();
        let grid = ScanPathModel::Grid(GridModel::default()); // axes y, x
        let step = ScanPathModel::Step(StepModel::new("energy", 0.0, 1.0, 1.0));

        let regions = vec![
            ScanRegion::new(
                vec![Roi::rectangular(0.0, 0.0, 1.0, 1.0)],
                vec!["x".into(), "y".into()],
            ),
            ScanRegion::unbounded(vec![Roi::elliptical(0.0, 0.0, 1.0, 1.0)]),
        ];

        // The grid matches both regions, the step only the unbounded one.
        assert_eq!(registry.find_regions(&grid, &regions).len(), 2);
        assert_eq!(registry.find_regions(&step, &regions).len(), 1);
        assert!(registry.find_regions(&grid, &[]).is_empty());
    }
}
