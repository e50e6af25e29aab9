//! # skein-graph
//!
//! Pure data model for analyzed bundler builds.
//!
//! This crate provides the in-memory build graph: modules and their
//! dependency edges, chunks/assets/entry points, the derived npm-package
//! view, and tree-shaking metadata (exports, variables, side effects). It
//! performs no I/O; ingestion lives in `skein-ingest` and comparison in
//! `skein-diff`.
//!
//! ## Overview
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ ModuleGraph  │   │  ChunkGraph  │   │ PackageGraph  │
//! │ Module       │   │  Chunk       │   │ Package       │
//! │ Dependency   │   │  Asset       │   │ (derived from │
//! │ ExportInfo … │   │  EntryPoint  │   │  ModuleGraph) │
//! └──────────────┘   └──────────────┘   └───────────────┘
//! ```
//!
//! Every entity carries a process-local integer id assigned at creation;
//! cross-references are id lists, never embedded entities, so a graph
//! serializes as a flat arena walk. One graph set belongs to exactly one
//! build: independent builds own independent graphs and id spaces.
//!
//! Lookups never throw for missing entities - absence is a first-class
//! `None`. Partial builds (no sources, no dependency edges) degrade to
//! whatever data is present.
//!
//! ## Quick start
//!
//! ```rust
//! use skein_graph::{Dependency, DependencyKind, Module, ModuleGraph, ModuleKind};
//!
//! let graph = ModuleGraph::new();
//! let a = graph.add_module(Module::new("/src/a.js", ModuleKind::Normal));
//! let b = graph.add_module(Module::new("/src/b.js", ModuleKind::Normal));
//! graph.add_dependency(Dependency::new("./b", DependencyKind::ImportStatement, a, b));
//!
//! let module = graph.module_by_id(a).unwrap();
//! assert_eq!(module.dependencies.len(), 1);
//! ```

pub mod chunk;
pub mod chunk_graph;
pub mod dependency;
pub mod ids;
pub mod module;
pub mod module_graph;
pub mod package;
pub mod package_graph;
pub mod statement;
pub mod tree_shaking;

pub use chunk::{Asset, Chunk, EntryPoint};
pub use chunk_graph::{ChunkGraph, ChunkGraphData, DataMode};
pub use dependency::{Dependency, DependencyKind, DependencyMeta};
pub use ids::{EntityKind, IdGenerator, IdentityRegistry};
pub use module::{Module, ModuleKind, ModuleSize, ModuleSource, keep_bailout_reason};
pub use module_graph::{ModuleGraph, ModuleGraphData};
pub use package::{Package, PackageMeta};
pub use package_graph::{DuplicateRef, PackageData, PackageGraph};
pub use statement::{SourcePosition, SourceRange, Statement};
pub use tree_shaking::{ExportInfo, ModuleGraphModule, SideEffect, Variable};

/// Error types for graph operations.
///
/// Absence of an entity is never an error; these cover invariant violations
/// and serialization failures only.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path rewrite would collide with another module's path.
    #[error("duplicate module path: {0}")]
    DuplicatePath(String),

    /// Snapshot serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests;
