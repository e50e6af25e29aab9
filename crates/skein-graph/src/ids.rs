//! Entity id allocation and native-id translation.
//!
//! Every graph entity gets a process-local, monotonically increasing id at
//! creation time. Counters are scoped per build: each graph set owns its own
//! [`IdGenerator`] and ids are never reused across independent builds.
//!
//! The [`IdentityRegistry`] translates bundler-native identifiers (large or
//! sparse integers, structural debug ids) into the compact internal ids used
//! for cross-referencing. Lookups return `None` for unknown natives; partial
//! ingestion is expected to omit some edges and callers skip rather than fail.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Kinds of entities that receive ids from one generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Module,
    Dependency,
    Chunk,
    Asset,
    EntryPoint,
    Package,
    ModuleGraphModule,
    ExportInfo,
    Variable,
    SideEffect,
}

/// Per-kind monotonic id counters for one build.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counters: FxHashMap<EntityKind, u32>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id for `kind`. Ids start at 1; 0 is never handed out
    /// so it can serve as an "unassigned" sentinel in intermediate structs.
    pub fn next(&mut self, kind: EntityKind) -> u32 {
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Reset all counters. Called at the start of an independent build.
    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

/// Translation table from bundler-native ids to internal ids.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    aliases: FxHashMap<(EntityKind, u64), u32>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the bundler knows internal entity `internal_id` as
    /// `native_id`. Re-registering the same native id overwrites the alias;
    /// patch streams may legitimately repeat structural events.
    pub fn register_alias(&mut self, kind: EntityKind, native_id: u64, internal_id: u32) {
        self.aliases.insert((kind, native_id), internal_id);
    }

    /// Resolve a bundler-native id. `None` means the entity was never
    /// registered (lite build, dropped patch) and the caller should skip.
    pub fn resolve(&self, kind: EntityKind, native_id: u64) -> Option<u32> {
        self.aliases.get(&(kind, native_id)).copied()
    }

    pub fn reset(&mut self) {
        self.aliases.clear();
    }
}
