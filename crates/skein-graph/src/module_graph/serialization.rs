//! Serializable snapshots of the module graph.

use serde::{Deserialize, Serialize};

use super::graph::ModuleGraph;
use crate::chunk_graph::DataMode;
use crate::dependency::Dependency;
use crate::module::{Module, ModuleSource};
use crate::tree_shaking::{ExportInfo, ModuleGraphModule};
use crate::{Error, Result};

/// Flat snapshot consumed by the report writer, the rule engine and the UI
/// server. Relationship fields inside the entities are id lists, so this is
/// a plain arena walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleGraphData {
    pub modules: Vec<Module>,
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub module_graph_modules: Vec<ModuleGraphModule>,
    #[serde(default)]
    pub exports: Vec<ExportInfo>,
}

impl ModuleGraph {
    /// Produce a serializable snapshot, insertion order preserved. `Lite`
    /// drops the captured per-module source texts, which dominate the
    /// payload of a full capture.
    pub fn to_data(&self, mode: DataMode) -> ModuleGraphData {
        let inner = self.inner.read();
        let mut module_graph_modules: Vec<ModuleGraphModule> =
            inner.module_graph_modules.values().cloned().collect();
        module_graph_modules.sort_by_key(|mgm| mgm.id);
        let mut exports: Vec<ExportInfo> = inner.exports.values().cloned().collect();
        exports.sort_by_key(|e| e.id);

        let modules = inner
            .modules
            .values()
            .map(|module| {
                let mut module = (**module).clone();
                if mode == DataMode::Lite {
                    module.source = ModuleSource::default();
                    module.original_source = None;
                }
                module
            })
            .collect();

        ModuleGraphData {
            modules,
            dependencies: inner.dependencies.values().map(|d| (**d).clone()).collect(),
            module_graph_modules,
            exports,
        }
    }

    /// Snapshot serialized to pretty JSON.
    pub fn to_json(&self, mode: DataMode) -> Result<String> {
        serde_json::to_string_pretty(&self.to_data(mode))
            .map_err(|e| Error::Serialization(format!("failed to serialize module graph: {e}")))
    }
}
