//! # skein-ingest
//!
//! Graph builders that turn raw compiler output into `skein-graph` build
//! graphs.
//!
//! Two ingestion paths produce the same target shape through the
//! [`GraphSource`] trait:
//!
//! - [`PatchSource`] consumes the ordered patch-event stream a compiler
//!   plugin emits during compilation (module/dependency/chunk structure,
//!   then asset, render-id and source detail).
//! - [`StatsSource`] reconstructs a build from one monolithic stats-snapshot
//!   JSON document, degrading gracefully when dependency or package detail
//!   is absent.
//!
//! Both finalize into a [`BuildSnapshot`]: module graph + chunk graph + the
//! derived package view, sealed and ready for diffing, rule checks or
//! serialization. Enrichment steps ([`enrich::capture_original_sources`],
//! [`parsed_size::overlay_parsed_sizes_from_disk`]) run against the module
//! graph before finalization and are all best-effort: a missing file or
//! unmatched id skips that entry and the build carries on.
//!
//! Each build owns its own graphs and identity registry; nothing is shared
//! across concurrent builds. Within one build, callers apply structural
//! patches before detail patches (single writer per build).

pub mod enrich;
pub mod parsed_size;
pub mod patch;
pub mod patch_source;
pub mod snapshot;
pub mod source;
pub mod stats;

#[cfg(feature = "logging")]
pub mod logging;

pub use patch::{
    AssetPatch, ChunkPatch, ModuleIdPatch, ModulePatch, ModuleSourcePatch, NativeChunkId,
};
pub use patch_source::PatchSource;
pub use snapshot::{BuildSnapshot, BuildSnapshotData, BuildSummary, SnapshotRegistry};
pub use source::GraphSource;
pub use stats::{StatsSource, is_stats_snapshot};

/// Error types for ingestion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The uploaded document is not a stats snapshot.
    #[error("invalid stats snapshot: {0}")]
    InvalidSnapshot(String),

    /// Graph invariant violation propagated from skein-graph.
    #[error(transparent)]
    Graph(#[from] skein_graph::Error),

    /// Snapshot serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error outside the per-file skip policy.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, Error>;
