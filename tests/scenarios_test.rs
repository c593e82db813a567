//! End-to-end scan scenarios driven through the registry.

use scangen::models::{
    BoundingBox, BoundingLine, CollatedStepModel, GridModel, OneDEqualSpacingModel, ScanPathModel,
    StaticModel, StepModel,
};
use scangen::position::UNINDEXED;
use scangen::region::Roi;
use scangen::registry::{GeneratorRegistry, RegistryBuilder};

fn registry() -> GeneratorRegistry {
    RegistryBuilder::with_builtins().build()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_step_scan_is_inclusive_of_both_ends() {
    let model = ScanPathModel::Step(StepModel::new("x", 0.0, 10.0, 2.0));
    let generator = registry().create_generator(&model).unwrap();
    assert_eq!(generator.total_count(), 6);

    let positions: Vec<_> = generator.collect();
    assert_eq!(positions.len(), 6);
    for (i, position) in positions.iter().enumerate() {
        assert_close(position.value("x").unwrap(), 2.0 * i as f64);
        assert_eq!(position.index("x").unwrap(), i as i64);
        assert_eq!(position.step_index(), i as u64);
        assert_close(position.exposure_time(), 0.0);
    }
}

#[test]
fn test_collated_step_moves_all_axes_together() {
    let model = ScanPathModel::CollatedStep(CollatedStepModel::new(
        vec!["a".to_string(), "b".to_string()],
        1.0,
        3.0,
        1.0,
    ));
    let positions: Vec<_> = registry().create_generator(&model).unwrap().collect();
    assert_eq!(positions.len(), 3);
    for (i, position) in positions.iter().enumerate() {
        let value = 1.0 + i as f64;
        assert_close(position.value("a").unwrap(), value);
        assert_close(position.value("b").unwrap(), value);
        // Collated axes carry no per-axis ordinal.
        assert_eq!(position.index("a").unwrap(), UNINDEXED);
        assert_eq!(position.index("b").unwrap(), UNINDEXED);
    }
}

#[test]
fn test_equal_spacing_line_insets_by_half_a_share() {
    let model = ScanPathModel::OneDEqualSpacing(OneDEqualSpacingModel::new(
        "x",
        "y",
        5,
        BoundingLine::new(0.0, 0.0, 10.0, 0.0),
    ));
    let positions: Vec<_> = registry().create_generator(&model).unwrap().collect();
    assert_eq!(positions.len(), 5);
    for (i, position) in positions.iter().enumerate() {
        assert_close(position.value("x").unwrap(), 1.0 + 2.0 * i as f64);
        assert_close(position.value("y").unwrap(), 0.0);
    }
}

#[test]
fn test_static_scan_yields_empty_positions() {
    let model = ScanPathModel::Static(StaticModel::new(3));
    let positions: Vec<_> = registry().create_generator(&model).unwrap().collect();
    assert_eq!(positions.len(), 3);
    for (i, position) in positions.iter().enumerate() {
        assert!(position.is_empty());
        assert_eq!(position.step_index(), i as u64);
    }
}

#[test]
fn test_compound_step_scans_nest_in_odometer_order() {
    let registry = registry();
    let outer = registry
        .create_generator(&ScanPathModel::Step(StepModel::new("y", 0.0, 1.0, 1.0)))
        .unwrap();
    let inner = registry
        .create_generator(&ScanPathModel::Step(StepModel::new("x", 0.0, 2.0, 1.0)))
        .unwrap();
    let compound = registry.compound_from_generators(vec![outer, inner]).unwrap();
    assert_eq!(compound.total_count(), 6);

    let expected = [
        (0.0, 0.0),
        (0.0, 1.0),
        (0.0, 2.0),
        (1.0, 0.0),
        (1.0, 1.0),
        (1.0, 2.0),
    ];
    let positions: Vec<_> = compound.collect();
    assert_eq!(positions.len(), expected.len());
    for (position, (y, x)) in positions.iter().zip(expected) {
        assert_close(position.value("y").unwrap(), y);
        assert_close(position.value("x").unwrap(), x);
    }
}

#[test]
fn test_gated_snake_grid_keeps_ungated_step_indices() {
    let mut grid = GridModel::new("x", "y", 3, 2, BoundingBox::new(0.0, 0.0, 4.0, 4.0));
    grid.snake = true;
    let model = ScanPathModel::Grid(grid);

    // Cell centres: x in {2/3, 2, 10/3}, y in {1, 3}. The rectangle keeps
    // only the first two cells of the first row.
    let rect = Roi::rectangular(0.5, 0.0, 2.0, 2.0);
    let generator = registry()
        .create_generator_with_regions(&model, vec![rect])
        .unwrap();
    assert_eq!(generator.total_count(), 6);

    let positions: Vec<_> = generator.collect();
    assert_eq!(positions.len(), 2);

    assert_close(positions[0].value("x").unwrap(), 2.0 / 3.0);
    assert_close(positions[0].value("y").unwrap(), 1.0);
    assert_eq!(positions[0].step_index(), 0);

    assert_close(positions[1].value("x").unwrap(), 2.0);
    assert_close(positions[1].value("y").unwrap(), 1.0);
    assert_eq!(positions[1].step_index(), 1);
}

#[test]
fn test_drained_generator_yields_exactly_total_count() {
    let registry = registry();
    for kind in scangen::models::ModelKind::ALL {
        let model = ScanPathModel::default_for(kind);
        let generator = registry.create_generator(&model).unwrap();
        let total = generator.total_count();
        let drained = generator.count() as u64;
        assert_eq!(drained, total, "kind {kind}");
    }
}
