//! Finished build snapshot and the boundary registry.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use skein_graph::{
    ChunkGraph, ChunkGraphData, DataMode, ModuleGraph, ModuleGraphData, PackageData, PackageGraph,
};

use crate::{Error, Result};

/// One fully built, sealed build: module graph, chunk graph, and the derived
/// package view. Handed read-only to the diff engine, rule checkers and
/// serializers.
///
/// `package_graph` is `None` when the source carried no module package
/// metadata (bare stats snapshot of an unknown project layout); consumers
/// degrade the package sections instead of failing.
#[derive(Debug, Clone)]
pub struct BuildSnapshot {
    pub name: String,
    pub module_graph: ModuleGraph,
    pub chunk_graph: ChunkGraph,
    pub package_graph: Option<PackageGraph>,
}

/// Aggregate counts for dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub modules: usize,
    pub dependencies: usize,
    pub chunks: usize,
    pub assets: usize,
    pub packages: usize,
}

/// Serializable form of a whole build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSnapshotData {
    pub name: String,
    pub module_graph: ModuleGraphData,
    pub chunk_graph: ChunkGraphData,
    /// Absent (not empty) when no package view could be derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<PackageData>>,
}

impl BuildSnapshot {
    pub fn summary(&self) -> BuildSummary {
        BuildSummary {
            modules: self.module_graph.module_count(),
            dependencies: self.module_graph.dependency_count(),
            chunks: self.chunk_graph.chunk_count(),
            assets: self.chunk_graph.asset_count(),
            packages: self
                .package_graph
                .as_ref()
                .map(PackageGraph::package_count)
                .unwrap_or(0),
        }
    }

    /// Serializable snapshot of the whole build. `mode` controls whether
    /// bulky asset content is included.
    pub fn to_data(&self, mode: DataMode) -> BuildSnapshotData {
        BuildSnapshotData {
            name: self.name.clone(),
            module_graph: self.module_graph.to_data(mode),
            chunk_graph: self.chunk_graph.to_data(mode),
            packages: self.package_graph.as_ref().map(PackageGraph::to_data),
        }
    }

    pub fn to_json(&self, mode: DataMode) -> Result<String> {
        serde_json::to_string_pretty(&self.to_data(mode))
            .map_err(|e| Error::Serialization(format!("failed to serialize build snapshot: {e}")))
    }
}

/// Registry keyed by build name, offered at the boundary for callers that
/// cannot thread a snapshot through their call stack (editor integrations,
/// multi-compiler hosts). The engines themselves always take the snapshot as
/// an explicit parameter.
#[derive(Clone, Default)]
pub struct SnapshotRegistry {
    inner: Arc<RwLock<FxHashMap<String, BuildSnapshot>>>,
}

impl SnapshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sealed build, replacing any previous build of the same
    /// name (watch-mode rebuilds).
    pub fn insert(&self, snapshot: BuildSnapshot) {
        self.inner
            .write()
            .insert(snapshot.name.clone(), snapshot);
    }

    pub fn get(&self, name: &str) -> Option<BuildSnapshot> {
        self.inner.read().get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<BuildSnapshot> {
        self.inner.write().remove(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().keys().cloned().collect();
        names.sort();
        names
    }
}
