//! Compound (multi-dimensional) scans built through the registry.

use scangen::error::GeneratorError;
use scangen::models::{
    BoundingBox, CompoundModel, GridModel, RepeatedPointModel, ScanPathModel, StaticModel,
    StepModel,
};
use scangen::region::{Roi, ScanRegion};
use scangen::registry::{GeneratorRegistry, RegistryBuilder};

fn registry() -> GeneratorRegistry {
    RegistryBuilder::with_builtins().build()
}

fn step(axis: &str, start: f64, stop: f64, step: f64) -> ScanPathModel {
    ScanPathModel::Step(StepModel::new(axis, start, stop, step))
}

#[test]
fn test_compound_model_produces_the_full_product() {
    let compound = CompoundModel::new(vec![
        step("z", 0.0, 1.0, 1.0),
        step("y", 0.0, 2.0, 1.0),
        step("x", 0.0, 3.0, 1.0),
    ]);
    let generator = registry().create_compound(&compound).unwrap();
    assert_eq!(generator.total_count(), 2 * 3 * 4);

    let positions: Vec<_> = generator.collect();
    assert_eq!(positions.len(), 24);
    // Innermost axis varies fastest.
    assert_eq!(positions[0].value("x").unwrap(), 0.0);
    assert_eq!(positions[1].value("x").unwrap(), 1.0);
    assert_eq!(positions[4].value("x").unwrap(), 0.0);
    assert_eq!(positions[4].value("y").unwrap(), 1.0);
    assert_eq!(positions[23].value("z").unwrap(), 1.0);
    // Step indices stay dense over the whole product.
    for (i, position) in positions.iter().enumerate() {
        assert_eq!(position.step_index(), i as u64);
        assert_eq!(position.len(), 3);
    }
}

#[test]
fn test_static_outer_repeats_the_inner_scan() {
    let compound = CompoundModel::new(vec![
        ScanPathModel::Static(StaticModel::new(2)),
        step("x", 0.0, 1.0, 1.0),
    ]);
    let positions: Vec<_> = registry().create_compound(&compound).unwrap().collect();
    assert_eq!(positions.len(), 4);
    let xs: Vec<f64> = positions
        .iter()
        .map(|p| p.value("x").unwrap())
        .collect();
    assert_eq!(xs, vec![0.0, 1.0, 0.0, 1.0]);
    // The static level contributes no axes.
    assert_eq!(positions[0].len(), 1);
}

#[test]
fn test_exposure_comes_from_the_innermost_level() {
    let mut outer = StepModel::new("y", 0.0, 1.0, 1.0);
    outer.exposure_time = 0.5;
    let mut inner = RepeatedPointModel::new("x", 7.0, 2);
    inner.exposure_time = 0.125;
    let compound = CompoundModel::new(vec![
        ScanPathModel::Step(outer),
        ScanPathModel::RepeatedPoint(inner),
    ]);
    let positions: Vec<_> = registry().create_compound(&compound).unwrap().collect();
    assert_eq!(positions.len(), 4);
    for position in &positions {
        assert_eq!(position.exposure_time(), 0.125);
    }
}

#[test]
fn test_duplicate_axes_across_levels_are_rejected() {
    let compound = CompoundModel::new(vec![
        step("x", 0.0, 1.0, 1.0),
        step("x", 0.0, 2.0, 1.0),
    ]);
    let err = registry().create_compound(&compound).unwrap_err();
    assert!(matches!(err, GeneratorError::AxisCollision { axis } if axis == "x"));
}

#[test]
fn test_regions_are_routed_to_matching_inner_scans() {
    // Outer energy scan is untouched; the grid is gated by the rectangle.
    let grid = ScanPathModel::Grid(GridModel::new(
        "x",
        "y",
        4,
        4,
        BoundingBox::new(0.0, 0.0, 4.0, 4.0),
    ));
    let mut compound = CompoundModel::new(vec![step("energy", 1.0, 2.0, 1.0), grid]);
    compound.push_region(ScanRegion::new(
        vec![Roi::rectangular(0.0, 0.0, 2.0, 4.0)],
        vec!["x".to_string(), "y".to_string()],
    ));

    let generator = registry().create_compound(&compound).unwrap();
    // Half the grid survives (x centres 0.5 and 1.5 of 0.5, 1.5, 2.5, 3.5),
    // for both energies.
    let positions: Vec<_> = generator.collect();
    assert_eq!(positions.len(), 2 * 8);
    for position in &positions {
        assert!(position.value("x").unwrap() <= 2.0);
    }
}

#[test]
fn test_unbounded_regions_gate_every_level_they_cover() {
    // No scannables listed: the region applies to any model whose point
    // carries the ROI axes; the step scan has no matching axes and passes.
    let grid = ScanPathModel::Grid(GridModel::new(
        "x",
        "y",
        2,
        2,
        BoundingBox::new(0.0, 0.0, 2.0, 2.0),
    ));
    let mut compound = CompoundModel::new(vec![step("energy", 0.0, 1.0, 1.0), grid]);
    compound.push_region(ScanRegion::unbounded(vec![Roi::rectangular(
        0.0, 0.0, 2.0, 2.0,
    )]));

    let positions: Vec<_> = registry().create_compound(&compound).unwrap().collect();
    // The whole grid lies inside the rectangle, so nothing is dropped.
    assert_eq!(positions.len(), 2 * 4);
}

#[test]
fn test_compound_abort_stops_between_points() {
    let compound = CompoundModel::new(vec![
        step("y", 0.0, 9.0, 1.0),
        step("x", 0.0, 9.0, 1.0),
    ]);
    let mut generator = registry().create_compound(&compound).unwrap();
    let handle = generator.abort_handle();

    assert!(generator.next().is_some());
    assert!(generator.next().is_some());
    handle.abort();
    assert!(generator.next().is_none());
    assert!(matches!(
        generator.try_next(),
        Err(GeneratorError::Aborted)
    ));
}

#[test]
fn test_started_inner_generators_cannot_be_composed() {
    let registry = registry();
    let outer = registry.create_generator(&step("y", 0.0, 1.0, 1.0)).unwrap();
    let mut inner = registry.create_generator(&step("x", 0.0, 1.0, 1.0)).unwrap();
    assert!(inner.next().is_some());

    let err = registry
        .compound_from_generators(vec![outer, inner])
        .unwrap_err();
    assert!(matches!(err, GeneratorError::UnsupportedOperation { .. }));
}
