//! Module entity: one unit of source code in the build.

use serde::{Deserialize, Serialize};

use crate::package::PackageMeta;

/// How the bundler materialized the module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleKind {
    /// A single source file.
    #[default]
    Normal,
    /// Several source modules fused into one runtime unit by scope hoisting.
    Concatenation,
}

/// Size of a module at the three pipeline stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSize {
    /// Bytes of the file as written by the author.
    pub source_size: u64,
    /// Bytes after loaders/transforms ran.
    pub transformed_size: u64,
    /// Bytes this module occupies in the emitted (minified) bundle.
    /// Stays 0 until the parsed-bundle overlay runs; a concatenated
    /// constituent typically reads 0 here because its bytes are attributed
    /// to the concatenation parent.
    pub parsed_size: u64,
}

/// Captured source texts for a module. All optional; lite ingestion may
/// carry none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<String>,
}

/// One unit of source code and its place in the graph.
///
/// Relationship fields hold ids, not embedded entities, so the graph stays
/// serializable as a flat arena walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: u32,
    /// Canonical file path. May carry a ` (layer)` suffix when the same file
    /// is compiled more than once under different configurations.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    /// Id the bundler itself used for this module, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_id: Option<u64>,
    pub is_entry: bool,
    pub kind: ModuleKind,
    pub size: ModuleSize,
    pub source: ModuleSource,
    /// Pre-transform source recovered from source maps, when captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_source: Option<String>,
    /// Id assigned by the bundler's runtime, used to match this module back
    /// to its wrapper in the emitted bundle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_id: Option<String>,
    /// Human-readable reasons an optimization did not apply. Internal
    /// fusion bookkeeping is filtered out before storage.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub bailout_reasons: Vec<String>,
    /// Reverse dependency edges (ids of Dependency entities targeting this
    /// module).
    #[serde(default)]
    pub imported_by: Vec<u32>,
    /// Forward dependency edges owned by this module.
    #[serde(default)]
    pub dependencies: Vec<u32>,
    /// Chunks this module is a member of (bundler-native chunk ids).
    #[serde(default)]
    pub chunks: Vec<String>,
    /// For `Concatenation` modules: ids of the constituent source modules.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub concatenation_children: Vec<u32>,
    /// For a constituent: ids of the concatenation module(s) it was fused
    /// into.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub concatenation_parents: Vec<u32>,
    /// Resolved npm package this module belongs to, when its path (or the
    /// ingestion source) could determine one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageMeta>,
}

impl Module {
    /// Create a module with an unassigned id. The owning graph assigns the
    /// real id on insertion.
    pub fn new(path: impl Into<String>, kind: ModuleKind) -> Self {
        Self {
            id: 0,
            path: path.into(),
            layer: None,
            native_id: None,
            is_entry: false,
            kind,
            size: ModuleSize::default(),
            source: ModuleSource::default(),
            original_source: None,
            render_id: None,
            bailout_reasons: Vec::new(),
            imported_by: Vec::new(),
            dependencies: Vec::new(),
            chunks: Vec::new(),
            concatenation_children: Vec::new(),
            concatenation_parents: Vec::new(),
            package: None,
        }
    }

    pub fn with_native_id(mut self, native_id: u64) -> Self {
        self.native_id = Some(native_id);
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        let layer = layer.into();
        self.path = format!("{} ({layer})", self.path);
        self.layer = Some(layer);
        self
    }

    pub fn with_entry(mut self, is_entry: bool) -> Self {
        self.is_entry = is_entry;
        self
    }

    pub fn with_size(mut self, size: ModuleSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_package(mut self, package: PackageMeta) -> Self {
        self.package = Some(package);
        self
    }

    /// Store bailout reasons, dropping internal concatenation bookkeeping
    /// that is not actionable for an end user.
    pub fn set_bailout_reasons<I, S>(&mut self, reasons: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bailout_reasons = reasons
            .into_iter()
            .map(Into::into)
            .filter(|reason| keep_bailout_reason(reason))
            .collect();
    }

    /// True if this module is a constituent of some concatenation group.
    pub fn is_concatenated_into(&self, parent_id: u32) -> bool {
        self.concatenation_parents.contains(&parent_id)
    }

    /// True if the module's output contributes no executable code (style
    /// sheets and friends). Used by the post-ingestion edge cleanup.
    pub fn is_style_only(&self) -> bool {
        const STYLE_EXTENSIONS: &[&str] = &[".css", ".less", ".scss", ".sass", ".styl"];
        // Strip a layer suffix before inspecting the extension.
        let path = match self.path.find(" (") {
            Some(idx) => &self.path[..idx],
            None => self.path.as_str(),
        };
        let lowered = path.to_ascii_lowercase();
        STYLE_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
    }
}

/// Filter predicate for bailout reasons. The optimizer emits messages about
/// its own fusion bookkeeping ("... concatenation is not applicable ...",
/// "ModuleConcatenation bailout: ...") that describe internal state rather
/// than an actionable cause; those are dropped.
pub fn keep_bailout_reason(reason: &str) -> bool {
    if reason.trim().is_empty() {
        return false;
    }
    let lowered = reason.to_ascii_lowercase();
    if lowered.contains("concatenation is not applicable") {
        return false;
    }
    if lowered.starts_with("moduleconcatenation bailout") {
        return false;
    }
    true
}
