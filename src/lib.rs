//! # patchbay: a dataflow execution engine
//!
//! Elements with typed input and output sockets are wired together inside a
//! package and evaluated at a fixed tick rate by a background thread.
//! Packages are elements themselves, so graphs nest.
//!
//! ## Architecture
//!
//! - **Graph**: values, sockets, the `Element` trait, connections and the
//!   `Package` slot table with its two-phase tick (propagate, then compute)
//! - **Registry**: element factories keyed by type tag plus an index of
//!   package files used to resolve external packages
//! - **Engine**: owns the root package and the evaluator thread; mutations
//!   park the evaluator between ticks through a condvar rendezvous
//! - **Config**: tick rate, package directories and log filter from TOML
//!
//! ## Example
//!
//! ```ignore
//! use patchbay::{config::EngineConfig, engine::Engine, graph::*};
//! use std::sync::Arc;
//!
//! let mut registry = Registry::new();
//! registry.register::<MyCounter>("demo/counter", "Counter");
//!
//! let mut engine = Engine::new(Arc::new(registry), EngineConfig::default());
//! let a = engine.add("demo/counter")?;
//! let b = engine.add("demo/counter")?;
//! engine.connect(Endpoint::output(a, 0), Endpoint::input(b, 0));
//! engine.start()?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result, ResultExt};
pub use graph::{Element, ElementCore, ElementExt, ElementId, Endpoint, Package, Registry};
