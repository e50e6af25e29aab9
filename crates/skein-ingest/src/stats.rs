//! Stats-snapshot ingestion path.
//!
//! Reconstructs the graph shape from one monolithic JSON document describing
//! a completed build. The snapshot already nests assets under chunks, so the
//! chunk graph is rebuilt directly; the module graph degrades to module+size
//! data when the snapshot carries no dependency detail (third-party
//! analyzer-style reports), and gains edges when `reasons` are present.

use async_trait::async_trait;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

use skein_graph::{
    Asset, Chunk, ChunkGraph, Dependency, DependencyKind, EntryPoint, Module, ModuleGraph,
    ModuleKind, ModuleSize, PackageGraph, PackageMeta,
};

use crate::patch::NativeChunkId;
use crate::snapshot::BuildSnapshot;
use crate::source::GraphSource;
use crate::{Error, Result};

/// True if `value` looks like a raw compiler stats snapshot: top-level
/// `assets` and `chunks` arrays. Returns false (never errors) so callers can
/// fall back to manifest-style parsing.
pub fn is_stats_snapshot(value: &Value) -> bool {
    value.get("assets").is_some_and(Value::is_array)
        && value.get("chunks").is_some_and(Value::is_array)
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct StatsFile {
    assets: Vec<StatsAsset>,
    chunks: Vec<StatsChunk>,
    #[serde(default)]
    modules: Vec<StatsModule>,
    #[serde(default)]
    entrypoints: std::collections::BTreeMap<String, StatsEntryPoint>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct StatsAsset {
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    chunks: Vec<NativeChunkId>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct StatsChunk {
    id: NativeChunkId,
    #[serde(default)]
    names: Vec<String>,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    initial: bool,
    #[serde(default)]
    entry: bool,
    #[serde(default)]
    parents: Vec<NativeChunkId>,
    #[serde(default)]
    children: Vec<NativeChunkId>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct StatsModule {
    /// Native id; number, string or null depending on configuration.
    #[serde(default)]
    id: Value,
    name: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    chunks: Vec<NativeChunkId>,
    #[serde(default)]
    reasons: Vec<StatsReason>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReason {
    #[serde(default)]
    module_name: Option<String>,
    #[serde(default, rename = "type")]
    reason_type: String,
    #[serde(default)]
    user_request: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct StatsEntryPoint {
    #[serde(default)]
    chunks: Vec<NativeChunkId>,
    #[serde(default)]
    assets: Vec<StatsAssetRef>,
}

/// Entry assets appear as bare strings in older snapshots and as objects in
/// newer ones.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
enum StatsAssetRef {
    Name(String),
    Object { name: String },
}

impl StatsAssetRef {
    fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Object { name } => name,
        }
    }
}

/// Builder for one build described by a stats snapshot.
pub struct StatsSource {
    name: String,
    root_path: Option<String>,
    stats: StatsFile,
}

impl StatsSource {
    /// Parse a snapshot from an already-decoded JSON value. Fails when the
    /// document is not a stats snapshot; use [`is_stats_snapshot`] first to
    /// probe uploads of unknown provenance.
    pub fn from_value(name: impl Into<String>, value: Value) -> Result<Self> {
        if !is_stats_snapshot(&value) {
            return Err(Error::InvalidSnapshot(
                "expected top-level `assets` and `chunks` arrays".to_string(),
            ));
        }
        let stats: StatsFile = serde_json::from_value(value)
            .map_err(|e| Error::InvalidSnapshot(format!("malformed stats snapshot: {e}")))?;
        Ok(Self {
            name: name.into(),
            root_path: None,
            stats,
        })
    }

    pub fn from_str(name: impl Into<String>, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::InvalidSnapshot(format!("snapshot is not valid JSON: {e}")))?;
        Self::from_value(name, value)
    }

    pub fn with_root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    fn build_chunk_graph(&self) -> ChunkGraph {
        let chunk_graph = ChunkGraph::new();

        let chunks = self
            .stats
            .chunks
            .iter()
            .map(|raw| {
                let id = raw.id.as_string();
                let name = raw.names.first().cloned().unwrap_or_else(|| id.clone());
                let mut chunk = Chunk::new(id, name)
                    .with_size(raw.size)
                    .with_flags(raw.initial, raw.entry);
                for parent in &raw.parents {
                    chunk.add_dependency(&parent.as_string());
                }
                for child in &raw.children {
                    chunk.add_imported(&child.as_string());
                }
                chunk
            })
            .collect();
        chunk_graph.set_chunks(chunks);

        for raw in &self.stats.assets {
            chunk_graph.add_asset(Asset::new(&raw.name, raw.size));
            for chunk in &raw.chunks {
                chunk_graph.link_chunk_asset(&chunk.as_string(), &raw.name);
            }
        }
        // Chunk-side file lists may mention assets the asset array omitted.
        for raw in &self.stats.chunks {
            for file in &raw.files {
                chunk_graph.add_asset(Asset::new(file, 0));
                chunk_graph.link_chunk_asset(&raw.id.as_string(), file);
            }
        }

        for (name, raw) in &self.stats.entrypoints {
            let entry_id = chunk_graph.add_entry_point(EntryPoint::new(name));
            chunk_graph.update_entry_point(entry_id, |entry| {
                for chunk in &raw.chunks {
                    entry.add_chunk(&chunk.as_string());
                }
            });
            for asset_ref in &raw.assets {
                let path = asset_ref.name();
                let size = chunk_graph.asset_by_path(path).map(|a| a.size).unwrap_or(0);
                chunk_graph.update_entry_point(entry_id, |entry| entry.add_asset(path, size));
            }
        }

        chunk_graph
    }

    fn build_module_graph(&self, chunk_graph: &ChunkGraph) -> ModuleGraph {
        let module_graph = ModuleGraph::new();

        for raw in &self.stats.modules {
            let (path, kind) = split_concatenated_name(&raw.name);
            let mut module = Module::new(path, kind).with_size(ModuleSize {
                source_size: raw.size,
                transformed_size: raw.size,
                parsed_size: 0,
            });
            if let Some(native) = raw.id.as_u64() {
                module = module.with_native_id(native);
            }
            if let Some(meta) = PackageMeta::from_module_path(&module.path) {
                module.package = Some(meta);
            }
            let module_id = module_graph.add_module(module);

            for chunk in &raw.chunks {
                let chunk_id = chunk.as_string();
                module_graph.add_module_to_chunk(module_id, &chunk_id);
                chunk_graph.update_chunk(&chunk_id, |c| c.add_module(module_id));
            }
        }

        // Second pass: dependency edges, available only when the snapshot
        // kept per-module reasons.
        for raw in &self.stats.modules {
            let (path, _) = split_concatenated_name(&raw.name);
            let Some(target) = module_graph.module_by_file(&path) else {
                continue;
            };
            for reason in &raw.reasons {
                let Some(origin_name) = reason.module_name.as_deref() else {
                    continue;
                };
                let (origin_path, _) = split_concatenated_name(origin_name);
                let Some(origin) = module_graph.module_by_file(&origin_path) else {
                    debug!(origin = origin_name, "skipping reason from unknown module");
                    continue;
                };
                let request = if reason.user_request.is_empty() {
                    path.clone()
                } else {
                    reason.user_request.clone()
                };
                module_graph.add_dependency(Dependency::new(
                    request,
                    DependencyKind::classify(&reason.reason_type),
                    origin.id,
                    target.id,
                ));
            }
        }

        module_graph
    }
}

#[async_trait]
impl GraphSource for StatsSource {
    async fn build(&mut self) -> Result<BuildSnapshot> {
        let chunk_graph = self.build_chunk_graph();
        let module_graph = self.build_module_graph(&chunk_graph);
        module_graph.remove_no_import_style();

        // A bare snapshot of an unknown layout may resolve no packages at
        // all; report the view as absent rather than empty so downstream
        // comparisons degrade instead of claiming "zero packages".
        let package_graph = {
            let derived =
                PackageGraph::from_module_graph(&module_graph, self.root_path.as_deref());
            (derived.package_count() > 0).then_some(derived)
        };

        Ok(BuildSnapshot {
            name: self.name.clone(),
            module_graph,
            chunk_graph,
            package_graph,
        })
    }
}

/// Normalize a stats module name to a canonical path, splitting off the
/// ` + N modules` suffix the compiler appends to concatenation groups.
fn split_concatenated_name(name: &str) -> (String, ModuleKind) {
    let (base, kind) = match name.split_once(" + ") {
        Some((base, rest)) if rest.ends_with("modules") => (base, ModuleKind::Concatenation),
        _ => (name, ModuleKind::Normal),
    };
    let cleaned = PathBuf::from(base.trim()).clean();
    (cleaned.to_string_lossy().into_owned(), kind)
}
