//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod elements;

use patchbay::{Engine, Registry};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a test waits on the evaluator before giving up
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// A registry with every test element kind registered
pub fn test_registry() -> Arc<Registry> {
    let mut registry = Registry::new();
    elements::register_all(&mut registry);
    Arc::new(registry)
}

/// Block until the engine has completed `count` more ticks
pub fn wait_for_ticks(engine: &Engine, count: u64) {
    let target = engine.ticks() + count;
    let deadline = Instant::now() + test_timeout();
    while engine.ticks() < target {
        assert!(
            Instant::now() < deadline,
            "Evaluator stalled at {} ticks (waiting for {})",
            engine.ticks(),
            target
        );
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
