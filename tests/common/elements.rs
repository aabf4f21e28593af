//! Element kinds used across the integration tests

use patchbay::graph::{
    Element, ElementCore, ElementDocument, ElementExt, GraphResult, Registry, SocketFlags,
    ValueType,
};
use std::time::Duration;

pub const COUNTER: &str = "test/counter";
pub const RELAY: &str = "test/relay";
pub const CONSTANT: &str = "test/constant";
pub const CLOCK: &str = "test/clock";

pub fn register_all(registry: &mut Registry) {
    registry.register::<Counter>(COUNTER, "Counter");
    registry.register::<Relay>(RELAY, "Relay");
    registry.register::<Constant>(CONSTANT, "Constant");
    registry.register::<Clock>(CLOCK, "Clock");
}

/// No inputs; output 0 counts computes since the last reset.
pub struct Counter {
    core: ElementCore,
    count: i32,
}

impl Default for Counter {
    fn default() -> Self {
        let mut counter = Self {
            core: ElementCore::default(),
            count: 0,
        };
        counter
            .add_output(ValueType::Int, "count", SocketFlags::DEFAULT)
            .unwrap();
        counter
    }
}

impl Element for Counter {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core
    }

    fn reset(&mut self) {
        self.count = 0;
    }

    fn compute(&mut self) {
        self.count += 1;
        self.core.set_output_value(0, self.count);
    }
}

/// Copies int input 0 to int output 0.
pub struct Relay {
    core: ElementCore,
}

impl Default for Relay {
    fn default() -> Self {
        let mut relay = Self {
            core: ElementCore::default(),
        };
        relay.add_input(ValueType::Int, "in", SocketFlags::DEFAULT).unwrap();
        relay.add_output(ValueType::Int, "out", SocketFlags::DEFAULT).unwrap();
        relay
    }
}

impl Element for Relay {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core
    }

    fn compute(&mut self) {
        let value = self.core.input_value(0);
        self.core.set_output_value(0, value);
    }
}

/// Writes a fixed float to output 0. The value is persisted in its own
/// document section.
pub struct Constant {
    core: ElementCore,
    pub value: f32,
}

impl Default for Constant {
    fn default() -> Self {
        let mut constant = Self {
            core: ElementCore::default(),
            value: 0.0,
        };
        constant
            .add_output(ValueType::Float, "value", SocketFlags::DEFAULT)
            .unwrap();
        constant
    }
}

impl Element for Constant {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core
    }

    fn compute(&mut self) {
        self.core.set_output_value(0, self.value);
    }

    fn serialize(&self) -> ElementDocument {
        let mut doc = self.core.to_document();
        doc.extra
            .insert("constant".into(), serde_json::json!({ "value": self.value }));
        doc
    }

    fn deserialize(&mut self, doc: &ElementDocument) -> GraphResult<()> {
        self.core.apply_document(doc, false)?;
        if let Some(value) = doc
            .extra
            .get("constant")
            .and_then(|c| c.get("value"))
            .and_then(|v| v.as_f64())
        {
            self.value = value as f32;
        }
        Ok(())
    }
}

/// Accumulates the time steps it is handed; output 0 is the total in
/// seconds.
pub struct Clock {
    core: ElementCore,
    pub elapsed: Duration,
    pub updates: u64,
}

impl Default for Clock {
    fn default() -> Self {
        let mut clock = Self {
            core: ElementCore::default(),
            elapsed: Duration::ZERO,
            updates: 0,
        };
        clock
            .add_output(ValueType::Float, "seconds", SocketFlags::DEFAULT)
            .unwrap();
        clock
    }
}

impl Element for Clock {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core
    }

    fn on_update(&mut self, dt: Duration) {
        self.elapsed += dt;
        self.updates += 1;
    }

    fn compute(&mut self) {
        let seconds = self.elapsed.as_secs_f32();
        self.core.set_output_value(0, seconds);
    }
}
