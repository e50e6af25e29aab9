//! In-memory chunk graph: chunks, assets and entry points.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::chunk::{Asset, Chunk, EntryPoint};
use crate::ids::{EntityKind, IdGenerator};
use crate::{Error, Result};

/// Controls how much bulk a serialized snapshot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataMode {
    /// Everything, including raw asset content.
    #[default]
    Full,
    /// Structural data only; asset content is dropped.
    Lite,
}

struct ChunkGraphInner {
    ids: IdGenerator,
    chunks: IndexMap<String, Arc<Chunk>>,
    assets: IndexMap<u32, Arc<Asset>>,
    assets_by_path: FxHashMap<String, u32>,
    entry_points: IndexMap<u32, Arc<EntryPoint>>,
}

/// Stores [`Chunk`], [`Asset`] and [`EntryPoint`] entities and their
/// many-to-many membership relations. Lookups return `None` for absent
/// entities.
#[derive(Clone)]
pub struct ChunkGraph {
    inner: Arc<RwLock<ChunkGraphInner>>,
}

/// Serializable snapshot of the chunk graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkGraphData {
    pub chunks: Vec<Chunk>,
    pub assets: Vec<Asset>,
    pub entrypoints: Vec<EntryPoint>,
}

impl ChunkGraph {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ChunkGraphInner {
                ids: IdGenerator::new(),
                chunks: IndexMap::new(),
                assets: IndexMap::new(),
                assets_by_path: FxHashMap::default(),
                entry_points: IndexMap::new(),
            })),
        }
    }

    /// Replace the chunk set. Duplicate ids in the input collapse to the
    /// last occurrence.
    pub fn set_chunks(&self, chunks: Vec<Chunk>) {
        let mut inner = self.inner.write();
        inner.chunks.clear();
        for chunk in chunks {
            inner.chunks.insert(chunk.id.clone(), Arc::new(chunk));
        }
    }

    /// Add one chunk if its id is new; an existing chunk is left untouched.
    pub fn add_chunk(&self, chunk: Chunk) {
        let mut inner = self.inner.write();
        if !inner.chunks.contains_key(&chunk.id) {
            inner.chunks.insert(chunk.id.clone(), Arc::new(chunk));
        }
    }

    pub fn chunks(&self) -> Vec<Arc<Chunk>> {
        self.inner.read().chunks.values().cloned().collect()
    }

    pub fn chunk_by_id(&self, id: &str) -> Option<Arc<Chunk>> {
        self.inner.read().chunks.get(id).cloned()
    }

    /// First chunk whose member set contains the module.
    pub fn chunk_for_module(&self, module_id: u32) -> Option<Arc<Chunk>> {
        self.inner
            .read()
            .chunks
            .values()
            .find(|chunk| chunk.modules.contains(&module_id))
            .cloned()
    }

    /// Apply a closure to one chunk. Returns false if the chunk is absent.
    pub fn update_chunk<F>(&self, chunk_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Chunk),
    {
        let mut inner = self.inner.write();
        let Some(chunk_arc) = inner.chunks.get(chunk_id) else {
            return false;
        };
        let mut chunk = (**chunk_arc).clone();
        f(&mut chunk);
        inner.chunks.insert(chunk_id.to_string(), Arc::new(chunk));
        true
    }

    /// Replace the asset set, assigning fresh ids.
    pub fn set_assets(&self, assets: Vec<Asset>) {
        let mut inner = self.inner.write();
        inner.assets.clear();
        inner.assets_by_path.clear();
        for asset in assets {
            Self::insert_asset(&mut inner, asset);
        }
    }

    /// Add one asset if its path is new, returning its id either way.
    pub fn add_asset(&self, asset: Asset) -> u32 {
        let mut inner = self.inner.write();
        if let Some(&existing) = inner.assets_by_path.get(&asset.path) {
            return existing;
        }
        Self::insert_asset(&mut inner, asset)
    }

    fn insert_asset(inner: &mut ChunkGraphInner, mut asset: Asset) -> u32 {
        let id = inner.ids.next(EntityKind::Asset);
        asset.id = id;
        inner.assets_by_path.insert(asset.path.clone(), id);
        inner.assets.insert(id, Arc::new(asset));
        id
    }

    pub fn assets(&self) -> Vec<Arc<Asset>> {
        self.inner.read().assets.values().cloned().collect()
    }

    pub fn asset_by_path(&self, path: &str) -> Option<Arc<Asset>> {
        let inner = self.inner.read();
        let id = inner.assets_by_path.get(path)?;
        inner.assets.get(id).cloned()
    }

    /// Apply a closure to one asset, addressed by path.
    pub fn update_asset<F>(&self, path: &str, f: F) -> bool
    where
        F: FnOnce(&mut Asset),
    {
        let mut inner = self.inner.write();
        let Some(&id) = inner.assets_by_path.get(path) else {
            return false;
        };
        let asset_arc = inner.assets.get(&id).expect("indexed asset must exist");
        let mut asset = (**asset_arc).clone();
        f(&mut asset);
        inner.assets.insert(id, Arc::new(asset));
        true
    }

    /// Replace the entry point set, assigning fresh ids.
    pub fn set_entry_points(&self, entry_points: Vec<EntryPoint>) {
        let mut inner = self.inner.write();
        inner.entry_points.clear();
        for mut entry in entry_points {
            let id = inner.ids.next(EntityKind::EntryPoint);
            entry.id = id;
            inner.entry_points.insert(id, Arc::new(entry));
        }
    }

    /// Add one entry point, returning its id. Entry points are keyed by
    /// name: re-adding a known name returns the existing id.
    pub fn add_entry_point(&self, entry: EntryPoint) -> u32 {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.entry_points.values().find(|e| e.name == entry.name) {
            return existing.id;
        }
        let id = inner.ids.next(EntityKind::EntryPoint);
        let mut entry = entry;
        entry.id = id;
        inner.entry_points.insert(id, Arc::new(entry));
        id
    }

    pub fn entry_points(&self) -> Vec<Arc<EntryPoint>> {
        self.inner.read().entry_points.values().cloned().collect()
    }

    pub fn entry_point_by_id(&self, id: u32) -> Option<Arc<EntryPoint>> {
        self.inner.read().entry_points.get(&id).cloned()
    }

    /// Apply a closure to one entry point.
    pub fn update_entry_point<F>(&self, id: u32, f: F) -> bool
    where
        F: FnOnce(&mut EntryPoint),
    {
        let mut inner = self.inner.write();
        let Some(entry_arc) = inner.entry_points.get(&id) else {
            return false;
        };
        let mut entry = (**entry_arc).clone();
        f(&mut entry);
        inner.entry_points.insert(id, Arc::new(entry));
        true
    }

    /// Record that `chunk_id` produced the asset at `path`, on both sides of
    /// the relation. Either side missing makes this a no-op.
    pub fn link_chunk_asset(&self, chunk_id: &str, path: &str) {
        self.update_chunk(chunk_id, |chunk| chunk.add_asset(path));
        self.update_asset(path, |asset| asset.add_chunk(chunk_id));
    }

    /// Modules that appear in more than one chunk. Input for bundle audits;
    /// a module duplicated across chunks ships twice.
    pub fn duplicate_modules_across_chunks(&self) -> Vec<(u32, Vec<String>)> {
        let inner = self.inner.read();
        let mut membership: FxHashMap<u32, Vec<String>> = FxHashMap::default();
        for chunk in inner.chunks.values() {
            for &module_id in &chunk.modules {
                membership.entry(module_id).or_default().push(chunk.id.clone());
            }
        }
        let mut duplicated: Vec<(u32, Vec<String>)> = membership
            .into_iter()
            .filter(|(_, chunks)| chunks.len() > 1)
            .collect();
        duplicated.sort_by_key(|(module_id, _)| *module_id);
        duplicated
    }

    /// Produce a serializable snapshot. `Lite` drops asset content, which is
    /// the bulky part of a captured build.
    pub fn to_data(&self, mode: DataMode) -> ChunkGraphData {
        let inner = self.inner.read();
        let assets = inner
            .assets
            .values()
            .map(|asset| {
                let mut asset = (**asset).clone();
                if mode == DataMode::Lite {
                    asset.content = String::new();
                }
                asset
            })
            .collect();

        ChunkGraphData {
            chunks: inner.chunks.values().map(|c| (**c).clone()).collect(),
            assets,
            entrypoints: inner.entry_points.values().map(|e| (**e).clone()).collect(),
        }
    }

    pub fn to_json(&self, mode: DataMode) -> Result<String> {
        serde_json::to_string_pretty(&self.to_data(mode))
            .map_err(|e| Error::Serialization(format!("failed to serialize chunk graph: {e}")))
    }

    pub fn chunk_count(&self) -> usize {
        self.inner.read().chunks.len()
    }

    pub fn asset_count(&self) -> usize {
        self.inner.read().assets.len()
    }
}

impl Default for ChunkGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChunkGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ChunkGraph")
            .field("chunks", &inner.chunks.len())
            .field("assets", &inner.assets.len())
            .field("entry_points", &inner.entry_points.len())
            .finish()
    }
}
