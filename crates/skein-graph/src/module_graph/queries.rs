//! Query methods for [`ModuleGraph`]. Absence is an explicit `None`/empty
//! result, never an error.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::graph::ModuleGraph;
use crate::dependency::Dependency;
use crate::module::Module;
use crate::tree_shaking::{ExportInfo, ModuleGraphModule};

impl ModuleGraph {
    /// Snapshot of all modules, insertion order preserved.
    pub fn modules(&self) -> Vec<Arc<Module>> {
        self.inner.read().modules.values().cloned().collect()
    }

    pub fn module_by_id(&self, id: u32) -> Option<Arc<Module>> {
        self.inner.read().modules.get(&id).cloned()
    }

    pub fn module_by_native_id(&self, native_id: u64) -> Option<Arc<Module>> {
        let inner = self.inner.read();
        let id = inner.by_native.get(&native_id)?;
        inner.modules.get(id).cloned()
    }

    pub fn module_by_file(&self, path: &str) -> Option<Arc<Module>> {
        let inner = self.inner.read();
        let id = inner.by_file.get(path)?;
        inner.modules.get(id).cloned()
    }

    /// Snapshot of all dependencies, insertion order preserved.
    pub fn dependencies(&self) -> Vec<Arc<Dependency>> {
        self.inner.read().dependencies.values().cloned().collect()
    }

    pub fn dependency_by_id(&self, id: u32) -> Option<Arc<Dependency>> {
        self.inner.read().dependencies.get(&id).cloned()
    }

    /// Tree-shaking view for a module, if the build carried export data.
    pub fn module_graph_module(&self, module_id: u32) -> Option<ModuleGraphModule> {
        self.inner.read().module_graph_modules.get(&module_id).cloned()
    }

    pub fn export_info(&self, id: u32) -> Option<ExportInfo> {
        self.inner.read().exports.get(&id).cloned()
    }

    /// Resolve a re-export chain to its terminal export.
    ///
    /// Well-formed input cannot cycle, but the walk keeps a visited set
    /// anyway; on a cycle (or a dangling link) there is no terminal export
    /// and the result is `None`.
    pub fn final_export(&self, export_id: u32) -> Option<ExportInfo> {
        let inner = self.inner.read();
        let mut visited = FxHashSet::default();
        let mut current = inner.exports.get(&export_id)?;
        while let Some(from) = current.from {
            if !visited.insert(current.id) {
                return None;
            }
            current = inner.exports.get(&from)?;
        }
        Some(current.clone())
    }

    /// Total size contributed by a set of modules, counting each
    /// concatenation group once: the parent's size is authoritative and a
    /// constituent contributes nothing when any of its parents is in the set.
    pub fn effective_size_of(&self, module_ids: &[u32]) -> u64 {
        let inner = self.inner.read();
        let id_set: FxHashSet<u32> = module_ids.iter().copied().collect();

        module_ids
            .iter()
            .filter_map(|id| inner.modules.get(id))
            .map(|module| {
                let fused = module
                    .concatenation_parents
                    .iter()
                    .any(|parent| id_set.contains(parent));
                if fused {
                    0
                } else {
                    contributed_size(module)
                }
            })
            .sum()
    }

    pub fn module_count(&self) -> usize {
        self.inner.read().modules.len()
    }

    pub fn dependency_count(&self) -> usize {
        self.inner.read().dependencies.len()
    }
}

/// Best size estimate for one module: emitted bytes when the parsed-bundle
/// overlay ran, otherwise post-transform, otherwise authored bytes.
fn contributed_size(module: &Module) -> u64 {
    if module.size.parsed_size > 0 {
        module.size.parsed_size
    } else if module.size.transformed_size > 0 {
        module.size.transformed_size
    } else {
        module.size.source_size
    }
}
