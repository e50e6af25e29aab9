//! Storage layout and construction for [`ModuleGraph`].

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::dependency::Dependency;
use crate::ids::IdGenerator;
use crate::module::Module;
use crate::tree_shaking::{ExportInfo, ModuleGraphModule};

/// Inner graph state guarded by one lock.
///
/// `modules` and `dependencies` are IndexMaps because snapshot queries
/// promise insertion order; the secondary maps are plain hash lookups.
pub(crate) struct ModuleGraphInner {
    pub ids: IdGenerator,
    pub modules: IndexMap<u32, Arc<Module>>,
    pub by_native: FxHashMap<u64, u32>,
    pub by_file: FxHashMap<String, u32>,
    pub dependencies: IndexMap<u32, Arc<Dependency>>,
    /// (origin module id, request) -> dependency id, for update-not-duplicate.
    pub dependency_index: FxHashMap<(u32, String), u32>,
    /// Tree-shaking views keyed by module id.
    pub module_graph_modules: FxHashMap<u32, ModuleGraphModule>,
    /// All ExportInfo entries, stored centrally so re-export chains can be
    /// walked by id across modules.
    pub exports: FxHashMap<u32, ExportInfo>,
}

/// Stores [`Module`] and [`Dependency`] entities and their relationships.
///
/// One graph instance belongs to exactly one build; independent builds own
/// independent graphs and id spaces. Lookups return `None` for absent
/// entities, never an error.
#[derive(Clone)]
pub struct ModuleGraph {
    pub(crate) inner: Arc<RwLock<ModuleGraphInner>>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ModuleGraphInner {
                ids: IdGenerator::new(),
                modules: IndexMap::new(),
                by_native: FxHashMap::default(),
                by_file: FxHashMap::default(),
                dependencies: IndexMap::new(),
                dependency_index: FxHashMap::default(),
                module_graph_modules: FxHashMap::default(),
                exports: FxHashMap::default(),
            })),
        }
    }
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModuleGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ModuleGraph")
            .field("modules", &inner.modules.len())
            .field("dependencies", &inner.dependencies.len())
            .field("module_graph_modules", &inner.module_graph_modules.len())
            .finish()
    }
}
