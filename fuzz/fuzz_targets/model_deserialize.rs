//! Fuzz target for scan-path model deserialization.
//!
//! Tests:
//! - Arbitrary JSON never panics the model parser
//! - Models that parse either validate or are rejected cleanly
//! - Generators built from parsed models iterate without panicking

#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use scangen::models::ScanPathModel;
use scangen::registry::{GeneratorRegistry, RegistryBuilder};

fn registry() -> &'static GeneratorRegistry {
    static REGISTRY: OnceLock<GeneratorRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| RegistryBuilder::with_builtins().build())
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(model) = serde_json::from_str::<ScanPathModel>(text) else {
        return;
    };

    // Anything that parsed must either build or fail with a clean error.
    let generator = match registry().create_generator(&model) {
        Ok(generator) => generator,
        Err(_) => return,
    };

    let total = generator.total_count();
    let mut last_step = None;
    for position in generator.take(512) {
        assert!(position.step_index() < total, "step index past total count");
        assert_eq!(position.names().len(), position.values().len());
        assert_eq!(position.names().len(), position.indices().len());
        if let Some(last) = last_step {
            assert!(position.step_index() > last, "step index must increase");
        }
        last_step = Some(position.step_index());
    }
});
