//! Configuration module for patchbay
//!
//! The engine reads an `EngineConfig` from a TOML file. Missing keys fall
//! back to their defaults, so an empty file is a valid configuration.
//!
//! # Config Location
//!
//! The default file lives in the platform-appropriate data directory:
//! - **Linux**: `~/.local/share/dev.hxyulin.patchbay/engine.toml`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.patchbay/engine.toml`
//! - **Windows**: `%APPDATA%\dev.hxyulin.patchbay\engine.toml`
//!
//! # Example
//!
//! ```toml
//! tick_rate_hz = 500
//! package_dirs = ["/usr/share/patchbay/packages"]
//! log_filter = "info,patchbay=debug"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.hxyulin.patchbay";

/// Config filename
pub const CONFIG_FILE: &str = "engine.toml";

/// Default evaluator rate in Hz (a 1 ms period)
pub const DEFAULT_TICK_RATE_HZ: u32 = 1000;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir()
        .ok_or_else(|| Error::Config("Could not determine app data directory".to_string()))?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the default config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Engine Config ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Evaluator ticks per second. 0 runs ticks back to back.
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,

    /// Directories scanned for package files at startup
    #[serde(default)]
    pub package_dirs: Vec<PathBuf>,

    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_tick_rate_hz() -> u32 {
    DEFAULT_TICK_RATE_HZ
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            package_dirs: Vec::new(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl EngineConfig {
    /// Target time between the starts of two ticks.
    pub fn tick_period(&self) -> Duration {
        if self.tick_rate_hz == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(1_000_000_000 / self.tick_rate_hz as u64)
        }
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load the config from the default location, returning defaults on any
    /// error or when no file exists
    pub fn load_or_default() -> Self {
        let Some(path) = config_path().filter(|p| p.exists()) else {
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {:?}, using defaults: {}", path, e);
            Self::default()
        })
    }

    /// Save the config to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))
    }

    /// Save the config to the default location
    pub fn save_default(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save(dir.join(CONFIG_FILE))
    }
}
