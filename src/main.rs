//! patchbay runner
//!
//! Loads a package file into a fresh engine, runs the evaluator for a while
//! and reports tick statistics.
//!
//! ```text
//! patchbay <package.json> [seconds] [--config engine.toml]
//! ```

use anyhow::{bail, Context};
use patchbay::{config::EngineConfig, Engine, Registry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct Args {
    package: PathBuf,
    seconds: f64,
    config: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut package = None;
    let mut seconds = 1.0;
    let mut config = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(PathBuf::from(args.next().context("--config needs a path")?));
            }
            _ if package.is_none() => package = Some(PathBuf::from(arg)),
            _ => {
                seconds = arg
                    .parse()
                    .with_context(|| format!("Invalid run time '{}'", arg))?;
            }
        }
    }

    let Some(package) = package else {
        bail!("usage: patchbay <package.json> [seconds] [--config engine.toml]");
    };
    Ok(Args {
        package,
        seconds,
        config,
    })
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::load_or_default(),
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting patchbay");

    let mut registry = Registry::new();
    for dir in &config.package_dirs {
        match registry.scan_packages(dir) {
            Ok(count) => tracing::info!("Indexed {} packages from {:?}", count, dir),
            Err(e) => tracing::warn!("Failed to scan {:?}: {}", dir, e),
        }
    }

    let mut engine = Engine::new(Arc::new(registry), config);
    engine.load(&args.package)?;

    let started = Instant::now();
    engine.start()?;
    std::thread::sleep(Duration::from_secs_f64(args.seconds.max(0.0)));
    engine.stop()?;

    let elapsed = started.elapsed().as_secs_f64();
    let ticks = engine.ticks();
    tracing::info!(
        "Ran {} ticks in {:.3}s ({:.1} ticks/s)",
        ticks,
        elapsed,
        ticks as f64 / elapsed.max(f64::EPSILON)
    );
    Ok(())
}
