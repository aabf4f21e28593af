//! Element type registry and the index of known package files.

use crate::graph::element::Element;
use crate::graph::error::{GraphError, GraphResult};
use crate::graph::package::{Package, PACKAGE_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub type ElementFactory = Box<dyn Fn() -> Box<dyn Element> + Send + Sync>;

/// Display metadata for a registered element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    pub type_tag: String,
    pub name: String,
}

/// A package file found on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Logical path recorded inside the file (`package.path`).
    pub path: String,
    /// Location of the file itself.
    pub filename: String,
    pub icon: String,
}

struct Entry {
    info: ElementInfo,
    factory: ElementFactory,
}

pub struct Registry {
    entries: BTreeMap<String, Entry>,
    packages: BTreeMap<String, PackageInfo>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry that knows the package type.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: BTreeMap::new(),
            packages: BTreeMap::new(),
        };
        registry.register_with(PACKAGE_TYPE, "Package", || Box::new(Package::new()));
        registry
    }

    pub fn register<E>(&mut self, type_tag: &str, name: &str)
    where
        E: Element + Default + 'static,
    {
        self.register_with(type_tag, name, || Box::new(E::default()));
    }

    /// Registers or replaces the constructor for `type_tag`.
    pub fn register_with<F>(&mut self, type_tag: &str, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Element> + Send + Sync + 'static,
    {
        if self.entries.contains_key(type_tag) {
            tracing::warn!("Replacing element type '{}'", type_tag);
        }
        self.entries.insert(
            type_tag.to_string(),
            Entry {
                info: ElementInfo {
                    type_tag: type_tag.to_string(),
                    name: name.to_string(),
                },
                factory: Box::new(factory),
            },
        );
    }

    pub fn has(&self, type_tag: &str) -> bool {
        self.entries.contains_key(type_tag)
    }

    pub fn info(&self, type_tag: &str) -> Option<&ElementInfo> {
        self.entries.get(type_tag).map(|e| &e.info)
    }

    pub fn types(&self) -> impl Iterator<Item = &ElementInfo> + '_ {
        self.entries.values().map(|e| &e.info)
    }

    pub fn create(&self, type_tag: &str) -> GraphResult<Box<dyn Element>> {
        let entry = self
            .entries
            .get(type_tag)
            .ok_or_else(|| GraphError::UnknownElementType(type_tag.to_string()))?;
        Ok((entry.factory)())
    }

    // ── Package index ──

    /// Indexes `info` under its logical path, or its filename when the path
    /// is empty.
    pub fn register_package(&mut self, info: PackageInfo) {
        let key = if info.path.is_empty() {
            info.filename.clone()
        } else {
            info.path.clone()
        };
        tracing::debug!("Registered package '{}' at {}", key, info.filename);
        self.packages.insert(key, info);
    }

    pub fn packages(&self) -> &BTreeMap<String, PackageInfo> {
        &self.packages
    }

    /// Looks a package up by logical path or by filename.
    pub fn find_package(&self, path: &str) -> Option<&PackageInfo> {
        self.packages
            .get(path)
            .or_else(|| self.packages.values().find(|p| p.path == path || p.filename == path))
    }

    /// Walks `dir` recursively and indexes every `*.json` package file.
    /// Unreadable files are logged and skipped. Returns the number indexed.
    pub fn scan_packages(&mut self, dir: impl AsRef<Path>) -> GraphResult<usize> {
        let mut found = 0;
        let mut pending = vec![dir.as_ref().to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                match Package::info_for(&path) {
                    Ok(info) => {
                        self.register_package(info);
                        found += 1;
                    }
                    Err(e) => tracing::warn!("Skipping package file {:?}: {}", path, e),
                }
            }
        }
        Ok(found)
    }
}
