//! Structured-event ingestion path.
//!
//! Converts the ordered patch stream emitted during compilation into the
//! unified graph shape. Callers apply structural patches (module/chunk
//! existence and membership) before detail patches (sources, render ids);
//! a detail patch referencing an unregistered native id is dropped rather
//! than queued, trading completeness for forward progress on lite builds.

use async_trait::async_trait;
use tracing::debug;

use skein_graph::{
    Chunk, ChunkGraph, Dependency, DependencyKind, EntityKind, EntryPoint, IdentityRegistry,
    Module, ModuleGraph, ModuleKind, ModuleSize, PackageGraph, PackageMeta, SourcePosition,
    SourceRange, Statement,
};

use crate::patch::{
    AssetPatch, ChunkPatch, ModuleIdPatch, ModulePatch, ModuleSourcePatch, RawModule,
    RawStatementLoc,
};
use crate::snapshot::BuildSnapshot;
use crate::source::GraphSource;
use crate::Result;

/// Builder for one build fed by compiler patch events.
///
/// Owns its graphs and identity registry; nothing is shared across builds,
/// so several compilers can ingest concurrently into separate sources.
pub struct PatchSource {
    name: String,
    root_path: Option<String>,
    module_graph: ModuleGraph,
    chunk_graph: ChunkGraph,
    registry: IdentityRegistry,
}

impl PatchSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_path: None,
            module_graph: ModuleGraph::new(),
            chunk_graph: ChunkGraph::new(),
            registry: IdentityRegistry::new(),
        }
    }

    /// Strip this prefix from package install roots when deriving the
    /// package view, keeping reports machine-independent.
    pub fn with_root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    /// Apply a structural module patch: module list, dependency edges,
    /// chunk membership. Idempotent; re-applying adds nothing.
    pub fn apply_module_patch(&mut self, patch: ModulePatch) {
        let mut pending_concatenations: Vec<(u64, Vec<u64>)> = Vec::new();

        for raw in patch.modules {
            if !raw.concatenated.is_empty() {
                pending_concatenations.push((raw.id, raw.concatenated.clone()));
            }
            let native_id = raw.id;
            let module = build_module(raw);
            let internal = self.module_graph.add_module(module);
            self.registry
                .register_alias(EntityKind::Module, native_id, internal);
        }

        for (parent_native, children_native) in pending_concatenations {
            let Some(parent) = self.registry.resolve(EntityKind::Module, parent_native) else {
                continue;
            };
            let children: Vec<u32> = children_native
                .iter()
                .filter_map(|&c| self.registry.resolve(EntityKind::Module, c))
                .collect();
            self.module_graph
                .set_concatenation_children(parent, &children);
        }

        for raw in patch.dependencies {
            let (Some(origin), Some(target)) = (
                self.registry.resolve(EntityKind::Module, raw.from),
                self.registry.resolve(EntityKind::Module, raw.to),
            ) else {
                debug!(from = raw.from, to = raw.to, request = %raw.request,
                       "skipping dependency with unresolved native id");
                continue;
            };
            let mut dep =
                Dependency::new(raw.request, DependencyKind::classify(&raw.kind), origin, target);
            dep.statements = raw
                .statements
                .iter()
                .map(|loc| build_statement(origin, loc))
                .collect();
            self.module_graph.add_dependency(dep);
        }

        for membership in patch.chunk_modules {
            let chunk_id = membership.chunk.as_string();
            // Membership may arrive before the chunk's own structural patch;
            // register a placeholder that the chunk patch later fills in.
            self.chunk_graph
                .add_chunk(Chunk::new(chunk_id.clone(), chunk_id.clone()));
            for native in membership.modules {
                let Some(module_id) = self.registry.resolve(EntityKind::Module, native) else {
                    continue;
                };
                self.chunk_graph
                    .update_chunk(&chunk_id, |chunk| chunk.add_module(module_id));
                self.module_graph.add_module_to_chunk(module_id, &chunk_id);
            }
        }
    }

    /// Apply a structural chunk patch. Existing chunks are updated in place
    /// so membership recorded by earlier patches survives.
    pub fn apply_chunk_patch(&mut self, patch: ChunkPatch) {
        for raw in patch.chunks {
            let id = raw.id.as_string();
            let name = if raw.name.is_empty() { id.clone() } else { raw.name.clone() };
            self.chunk_graph.add_chunk(Chunk::new(id.clone(), name.clone()));
            self.chunk_graph.update_chunk(&id, |chunk| {
                chunk.name = name.clone();
                chunk.size = raw.size;
                chunk.initial = raw.initial;
                chunk.entry = raw.entry;
                for dep in &raw.dependencies {
                    chunk.add_dependency(&dep.as_string());
                }
                for imported in &raw.imported {
                    chunk.add_imported(&imported.as_string());
                }
            });
        }

        for raw in patch.entrypoints {
            let entry_id = self.chunk_graph.add_entry_point(EntryPoint::new(&raw.name));
            self.chunk_graph.update_entry_point(entry_id, |entry| {
                for chunk in &raw.chunks {
                    entry.add_chunk(&chunk.as_string());
                }
            });
        }
    }

    /// Apply an asset patch: emitted files and chunk/entrypoint ownership.
    pub fn apply_asset_patch(&mut self, patch: AssetPatch) {
        for raw in patch.assets {
            let mut asset = skein_graph::Asset::new(raw.path, raw.size);
            asset.gzip_size = raw.gzip_size;
            if let Some(content) = raw.content {
                asset.content = content;
            }
            self.chunk_graph.add_asset(asset);
        }

        for ownership in patch.chunk_assets {
            let chunk_id = ownership.chunk.as_string();
            for path in &ownership.assets {
                self.chunk_graph.link_chunk_asset(&chunk_id, path);
            }
        }

        for membership in patch.entrypoint_assets {
            let Some(entry) = self
                .chunk_graph
                .entry_points()
                .into_iter()
                .find(|e| e.name == membership.name)
            else {
                debug!(entrypoint = %membership.name, "skipping assets for unknown entrypoint");
                continue;
            };
            for path in &membership.assets {
                let size = self
                    .chunk_graph
                    .asset_by_path(path)
                    .map(|a| a.size)
                    .unwrap_or(0);
                self.chunk_graph
                    .update_entry_point(entry.id, |e| e.add_asset(path, size));
            }
        }
    }

    /// Apply a render-id detail patch. Rows referencing unregistered modules
    /// are dropped.
    pub fn apply_module_id_patch(&mut self, patch: ModuleIdPatch) {
        for row in patch.module_ids {
            if !self.module_graph.set_render_id(row.module, row.render_id) {
                debug!(native_id = row.module, "dropping render id for unknown module");
            }
        }
    }

    /// Apply an original-source detail patch. Rows referencing unregistered
    /// modules are dropped.
    pub fn apply_module_source_patch(&mut self, patch: ModuleSourcePatch) {
        for row in patch.module_original_sources {
            if !self.module_graph.set_original_source(row.module, row.source) {
                debug!(native_id = row.module, "dropping original source for unknown module");
            }
        }
    }

    /// Borrow the module graph mid-ingestion (enrichment steps run against
    /// it before finalization).
    pub fn module_graph(&self) -> &ModuleGraph {
        &self.module_graph
    }

    pub fn chunk_graph(&self) -> &ChunkGraph {
        &self.chunk_graph
    }

    fn finalize(&mut self) -> BuildSnapshot {
        self.module_graph.remove_no_import_style();
        // Same policy as the stats path: when no module resolved package
        // metadata the view is absent, not empty, and downstream package
        // comparisons degrade instead of claiming "zero packages".
        let package_graph = {
            let derived =
                PackageGraph::from_module_graph(&self.module_graph, self.root_path.as_deref());
            (derived.package_count() > 0).then_some(derived)
        };
        BuildSnapshot {
            name: self.name.clone(),
            module_graph: self.module_graph.clone(),
            chunk_graph: self.chunk_graph.clone(),
            package_graph,
        }
    }
}

#[async_trait]
impl GraphSource for PatchSource {
    async fn build(&mut self) -> Result<BuildSnapshot> {
        Ok(self.finalize())
    }
}

fn build_module(raw: RawModule) -> Module {
    let kind = if raw.concatenated.is_empty() {
        ModuleKind::Normal
    } else {
        ModuleKind::Concatenation
    };
    let mut module = Module::new(raw.path, kind)
        .with_native_id(raw.id)
        .with_entry(raw.is_entry)
        .with_size(ModuleSize {
            source_size: raw.source_size,
            transformed_size: raw.transformed_size,
            parsed_size: 0,
        });
    if let Some(layer) = raw.layer {
        module = module.with_layer(layer);
    }
    module.source.source = raw.source;
    module.source.transformed = raw.transformed;
    module.set_bailout_reasons(raw.bailout_reasons);

    if let Some(mut meta) = PackageMeta::from_module_path(&module.path) {
        if let Some(version) = raw.package_version {
            meta.version = version;
        }
        module.package = Some(meta);
    }
    module
}

fn build_statement(module_id: u32, loc: &RawStatementLoc) -> Statement {
    let end = loc
        .end_line
        .map(|line| SourcePosition::new(line, loc.end_column));
    Statement::new(
        module_id,
        Some(SourceRange::new(
            SourcePosition::new(loc.start_line, loc.start_column),
            end,
        )),
        None,
    )
}
