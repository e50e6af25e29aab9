//! Package-level view derived from the module graph.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ids::{EntityKind, IdGenerator};
use crate::module_graph::ModuleGraph;
use crate::package::{Package, PackageMeta};
use crate::{Error, Result};

struct PackageGraphInner {
    ids: IdGenerator,
    /// Keyed by (name, version, root) identity.
    packages: IndexMap<PackageMeta, Arc<Package>>,
}

/// Groups modules by resolved npm package instance and flags duplicate
/// installs. Derived read-only from a sealed module graph.
#[derive(Clone)]
pub struct PackageGraph {
    inner: Arc<RwLock<PackageGraphInner>>,
}

/// One row of the serialized package list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageData {
    pub name: String,
    pub version: String,
    pub root: String,
    pub size: u64,
    /// Sibling installs of the same package name: (version, root) pairs.
    pub duplicates: Vec<DuplicateRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRef {
    pub version: String,
    pub root: String,
}

impl PackageGraph {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(PackageGraphInner {
                ids: IdGenerator::new(),
                packages: IndexMap::new(),
            })),
        }
    }

    /// Build the package view from a module graph.
    ///
    /// Pass 1 groups every module carrying resolved package metadata into a
    /// package keyed by (name, version, root), accumulating members and
    /// sizes. Pass 2 groups packages by name alone and cross-links every
    /// group of two or more as duplicates of each other. Modules without
    /// resolvable metadata are skipped; they stay in the module graph but
    /// join no package. `root_path`, when given, is stripped from install
    /// roots so reports stay machine-independent.
    pub fn from_module_graph(module_graph: &ModuleGraph, root_path: Option<&str>) -> Self {
        let graph = Self::new();
        {
            let mut inner = graph.inner.write();

            for module in module_graph.modules() {
                let Some(meta) = module.package.clone() else {
                    continue;
                };
                let meta = match root_path {
                    Some(prefix) => PackageMeta {
                        root: meta
                            .root
                            .strip_prefix(prefix)
                            .map(str::to_string)
                            .unwrap_or(meta.root.clone()),
                        ..meta
                    },
                    None => meta,
                };

                let size = if module.size.parsed_size > 0 {
                    module.size.parsed_size
                } else if module.size.transformed_size > 0 {
                    module.size.transformed_size
                } else {
                    module.size.source_size
                };

                match inner.packages.get(&meta) {
                    Some(existing) => {
                        let mut package = (**existing).clone();
                        if !package.modules.contains(&module.id) {
                            package.modules.push(module.id);
                            package.size += size;
                        }
                        inner.packages.insert(meta, Arc::new(package));
                    }
                    None => {
                        let mut package = Package::new(&meta);
                        package.id = inner.ids.next(EntityKind::Package);
                        package.modules.push(module.id);
                        package.size = size;
                        inner.packages.insert(meta, Arc::new(package));
                    }
                }
            }

            Self::mark_duplicates(&mut inner);
        }
        graph
    }

    /// Second pass: group by name only and cross-link siblings.
    fn mark_duplicates(inner: &mut PackageGraphInner) {
        let mut by_name: FxHashMap<String, Vec<u32>> = FxHashMap::default();
        for package in inner.packages.values() {
            by_name.entry(package.name.clone()).or_default().push(package.id);
        }

        let mut sibling_map: FxHashMap<u32, Vec<u32>> = FxHashMap::default();
        for ids in by_name.values() {
            if ids.len() < 2 {
                continue;
            }
            for &id in ids {
                sibling_map.insert(id, ids.iter().copied().filter(|&o| o != id).collect());
            }
        }

        let keys: Vec<PackageMeta> = inner.packages.keys().cloned().collect();
        for key in keys {
            let package = inner.packages.get(&key).expect("key just listed");
            let siblings = sibling_map.get(&package.id).cloned().unwrap_or_default();
            let mut updated = (**package).clone();
            updated.duplicates = siblings;
            inner.packages.insert(key, Arc::new(updated));
        }
    }

    pub fn packages(&self) -> Vec<Arc<Package>> {
        self.inner.read().packages.values().cloned().collect()
    }

    pub fn package_by_id(&self, id: u32) -> Option<Arc<Package>> {
        self.inner
            .read()
            .packages
            .values()
            .find(|p| p.id == id)
            .cloned()
    }

    /// All package instances sharing a name.
    pub fn packages_by_name(&self, name: &str) -> Vec<Arc<Package>> {
        self.inner
            .read()
            .packages
            .values()
            .filter(|p| p.name == name)
            .cloned()
            .collect()
    }

    /// Package names installed more than once (differing version or root).
    pub fn duplicate_package_names(&self) -> Vec<String> {
        let inner = self.inner.read();
        let mut names: Vec<String> = inner
            .packages
            .values()
            .filter(|p| !p.duplicates.is_empty())
            .map(|p| p.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Serializable package list; `duplicates` is always present, possibly
    /// empty.
    pub fn to_data(&self) -> Vec<PackageData> {
        let inner = self.inner.read();
        inner
            .packages
            .values()
            .map(|package| {
                let duplicates = package
                    .duplicates
                    .iter()
                    .filter_map(|id| inner.packages.values().find(|p| p.id == *id))
                    .map(|sibling| DuplicateRef {
                        version: sibling.version.clone(),
                        root: sibling.root.clone(),
                    })
                    .collect();
                PackageData {
                    name: package.name.clone(),
                    version: package.version.clone(),
                    root: package.root.clone(),
                    size: package.size,
                    duplicates,
                }
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_data())
            .map_err(|e| Error::Serialization(format!("failed to serialize package graph: {e}")))
    }

    pub fn package_count(&self) -> usize {
        self.inner.read().packages.len()
    }
}

impl Default for PackageGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PackageGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageGraph")
            .field("packages", &self.package_count())
            .finish()
    }
}
