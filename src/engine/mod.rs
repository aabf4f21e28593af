//! Engine: the root package plus its evaluator thread.
//!
//! The evaluator runs on a dedicated thread. Each iteration:
//! 1. Park while pause requests are outstanding (exit on quit).
//! 2. Measure the time since the previous tick.
//! 3. `on_update(dt)` + `calculate()` on the root package.
//! 4. Idle out the rest of the configured period.
//!
//! Every mutation goes through [`Engine::edit`] (or one of the shorthands
//! built on it), which first parks the evaluator through the [`PauseGate`]
//! and then takes the root lock. The lock is therefore never contended by a
//! running tick; it exists so the exclusive access is visible to the type
//! system.

pub mod pause;

pub use pause::{PauseGate, PauseGuard};

use crate::config::EngineConfig;
use crate::error::{Error, Result, ResultExt};
use crate::graph::{Element, ElementId, Endpoint, GraphResult, Package, Registry};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

struct Shared {
    root: Mutex<Package>,
    gate: PauseGate,
    ticks: AtomicU64,
}

pub struct Engine {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    config: EngineConfig,
}

impl Engine {
    /// An engine around an empty root package.
    pub fn new(registry: Arc<Registry>, config: EngineConfig) -> Self {
        Self::with_package(Package::with_registry(registry), config)
    }

    pub fn with_package(root: Package, config: EngineConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                root: Mutex::new(root),
                gate: PauseGate::new(),
                ticks: AtomicU64::new(0),
            }),
            worker: None,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Ticks completed since the engine was created.
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }

    /// Spawns the evaluator thread. Does nothing if it is already running.
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        let shared = self.shared.clone();
        let period = self.config.tick_period();
        shared.gate.begin();
        let spawned = std::thread::Builder::new()
            .name("patchbay-evaluator".to_string())
            .spawn(move || evaluate(&shared, period));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                tracing::info!("Evaluator started at {} Hz", self.config.tick_rate_hz);
                Ok(())
            }
            Err(e) => {
                self.shared.gate.finish();
                Err(Error::Io(e))
            }
        }
    }

    /// Waits out in-flight pauses, then stops and joins the evaluator.
    pub fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };
        self.shared.gate.shutdown();
        let joined = handle.join();
        tracing::info!("Evaluator stopped after {} ticks", self.ticks());
        joined.map_err(|_| Error::EvaluatorPanicked)
    }

    /// Parks the evaluator until the guard is dropped. Guards nest, and
    /// every engine operation taken while one is held runs without a tick
    /// in between.
    pub fn pause(&self) -> PauseGuard<'_> {
        self.shared.gate.request()
    }

    /// Runs `f` on the root package with the evaluator parked.
    pub fn edit<R>(&self, f: impl FnOnce(&mut Package) -> R) -> R {
        let _pause = self.pause();
        let mut root = self.shared.root.lock();
        f(&mut root)
    }

    pub fn add(&self, type_tag: &str) -> GraphResult<ElementId> {
        self.edit(|root| root.add(type_tag))
    }

    /// # Panics
    /// If `id` is 0 or not occupied.
    pub fn remove(&self, id: ElementId) -> Box<dyn Element> {
        self.edit(|root| root.remove(id))
    }

    /// # Panics
    /// If either endpoint does not resolve to a socket.
    pub fn connect(&self, from: Endpoint, to: Endpoint) {
        self.edit(|root| root.connect(from, to))
    }

    pub fn try_connect(&self, from: Endpoint, to: Endpoint) -> GraphResult<()> {
        self.edit(|root| root.try_connect(from, to))
    }

    pub fn disconnect(&self, from: Endpoint, to: Endpoint) -> bool {
        self.edit(|root| root.disconnect(from, to))
    }

    /// Replaces the root package with the file at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.edit(|root| root.open(path))
            .context(format!("Failed to load {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.edit(|root| root.save(path))
            .context(format!("Failed to save {}", path.display()))
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::error!("Engine shutdown failed: {}", e);
        }
    }
}

fn evaluate(shared: &Shared, period: Duration) {
    let _running = shared.gate.running_token();
    tracing::debug!("Evaluator thread running");

    let mut last = Instant::now();
    while shared.gate.checkpoint() {
        let now = Instant::now();
        let dt = now - last;
        last = now;

        {
            let mut root = shared.root.lock();
            root.on_update(dt);
            root.calculate();
        }
        shared.ticks.fetch_add(1, Ordering::Relaxed);

        let spent = now.elapsed();
        if spent < period {
            shared.gate.idle(period - spent);
        }
    }

    tracing::debug!("Evaluator thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PACKAGE_TYPE;

    fn engine() -> Engine {
        Engine::new(Arc::new(Registry::new()), EngineConfig::default())
    }

    fn wait_for_ticks(engine: &Engine, count: u64) {
        let target = engine.ticks() + count;
        let deadline = Instant::now() + Duration::from_secs(5);
        while engine.ticks() < target {
            assert!(Instant::now() < deadline, "evaluator made no progress");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_start_stop() {
        let mut engine = engine();
        assert!(!engine.is_running());
        engine.start().unwrap();
        engine.start().unwrap();
        assert!(engine.is_running());
        wait_for_ticks(&engine, 3);
        engine.stop().unwrap();
        assert!(!engine.is_running());
        engine.stop().unwrap();
    }

    #[test]
    fn test_pause_freezes_ticks() {
        let mut engine = engine();
        engine.start().unwrap();
        wait_for_ticks(&engine, 1);
        {
            let _pause = engine.pause();
            let frozen = engine.ticks();
            std::thread::sleep(Duration::from_millis(10));
            assert_eq!(engine.ticks(), frozen);
            let id = engine.add(PACKAGE_TYPE).unwrap();
            assert_eq!(id, ElementId(1));
            assert_eq!(engine.ticks(), frozen);
        }
        wait_for_ticks(&engine, 2);
        engine.stop().unwrap();
    }

    #[test]
    fn test_edit_without_evaluator() {
        let engine = engine();
        let count = engine.edit(|root| {
            root.add(PACKAGE_TYPE).unwrap();
            root.add(PACKAGE_TYPE).unwrap();
            root.element_count()
        });
        assert_eq!(count, 2);
        assert_eq!(engine.ticks(), 0);
    }

    #[test]
    fn test_evaluator_panic_is_reported() {
        struct Boom {
            core: crate::graph::ElementCore,
        }

        impl Element for Boom {
            fn core(&self) -> &crate::graph::ElementCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut crate::graph::ElementCore {
                &mut self.core
            }

            fn compute(&mut self) {
                panic!("boom");
            }
        }

        let mut registry = Registry::new();
        registry.register_with("test/boom", "Boom", || {
            Box::new(Boom {
                core: crate::graph::ElementCore::default(),
            })
        });
        let mut engine = Engine::new(Arc::new(registry), EngineConfig::default());
        engine.add("test/boom").unwrap();
        engine.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while engine.shared.gate.is_running() {
            assert!(Instant::now() < deadline, "evaluator never ticked");
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(matches!(engine.stop(), Err(Error::EvaluatorPanicked)));
    }
}
