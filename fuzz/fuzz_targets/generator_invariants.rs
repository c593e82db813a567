//! Fuzz target for generator iteration invariants.
//!
//! Tests:
//! - Gated counts never exceed the ungated total
//! - Every emitted position lies inside one of the attached regions
//! - Snake ordering never changes which cells are visited

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scangen::models::{BoundingBox, GridModel, ScanPathModel};
use scangen::region::Roi;
use scangen::registry::RegistryBuilder;

/// Fuzz input describing a grid scan with an optional circular region
#[derive(Debug, Arbitrary)]
struct GridInput {
    /// Grid shape, mapped into 1..=12 per side
    fast_count: u8,
    slow_count: u8,
    snake: bool,
    /// Box placement, mapped into small finite coordinates
    origin: (i8, i8),
    extent: (i8, i8),
    /// Optional elliptical gate centred inside the box
    gate: Option<(u8, u8)>,
}

fuzz_target!(|input: GridInput| {
    let fast_count = u64::from(input.fast_count % 12) + 1;
    let slow_count = u64::from(input.slow_count % 12) + 1;
    let origin = (f64::from(input.origin.0), f64::from(input.origin.1));
    // Keep lengths signed but nonzero so cell arithmetic stays finite.
    let fast_length = f64::from(input.extent.0) + 0.5;
    let slow_length = f64::from(input.extent.1) + 0.5;

    let mut model = GridModel::new(
        "x",
        "y",
        fast_count,
        slow_count,
        BoundingBox::new(origin.0, origin.1, fast_length, slow_length),
    );
    model.snake = input.snake;
    let model = ScanPathModel::Grid(model);

    let registry = RegistryBuilder::with_builtins().build();

    let dense: Vec<_> = match registry.create_generator(&model) {
        Ok(generator) => generator.collect(),
        Err(_) => return,
    };
    assert_eq!(dense.len() as u64, fast_count * slow_count);

    let Some((a, b)) = input.gate else { return };
    let semi_x = f64::from(a % 32) / 4.0 + 0.25;
    let semi_y = f64::from(b % 32) / 4.0 + 0.25;
    let centre = (
        origin.0 + fast_length / 2.0,
        origin.1 + slow_length / 2.0,
    );
    let roi = Roi::elliptical(centre.0, centre.1, semi_x, semi_y);

    let gated = match registry.create_generator_with_regions(&model, vec![roi.clone()]) {
        Ok(generator) => generator,
        Err(_) => return,
    };
    let total = gated.total_count();

    let mut emitted = 0u64;
    let mut last_step = None;
    for position in gated {
        emitted += 1;
        let x = position.value("x").unwrap();
        let y = position.value("y").unwrap();
        assert!(roi.contains_point(x, y), "gated point escaped the region");
        if let Some(last) = last_step {
            assert!(position.step_index() > last, "step index must increase");
        }
        last_step = Some(position.step_index());
    }
    assert!(emitted <= total, "gated count exceeded ungated total");
});
