//! Dependency entity: a directed edge between two modules.

use serde::{Deserialize, Serialize};

use crate::statement::Statement;

/// Resolved import kind, classified from the raw dependency-type string the
/// bundler reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyKind {
    ImportStatement,
    RequireCall,
    DynamicImport,
    AMDRequire,
    #[default]
    Unknown,
}

impl DependencyKind {
    /// Classify a raw dependency-type string with ordered substring checks;
    /// first match wins, unrecognized strings map to `Unknown` so ingestion
    /// never fails on a new bundler dependency type.
    ///
    /// The dynamic-import check runs before the static-import check because
    /// the bundler phrases dynamic imports as `import()`.
    pub fn classify(raw: &str) -> Self {
        let lowered = raw.to_ascii_lowercase();
        if lowered.contains("import()") || lowered.contains("dynamic") {
            Self::DynamicImport
        } else if lowered.contains("amd") {
            Self::AMDRequire
        } else if lowered.contains("harmony") || lowered.contains("esm") || lowered.contains("import")
        {
            Self::ImportStatement
        } else if lowered.contains("cjs") || lowered.contains("require") {
            Self::RequireCall
        } else {
            Self::Unknown
        }
    }
}

/// Export-usage shape reported by the bundler for one edge, kept verbatim
/// for consumers that audit tree shaking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyMeta {
    /// Names the importing side actually uses, when the bundler tracked them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_exports: Option<Vec<String>>,
    /// True if the bundler considers every export of the target used.
    #[serde(default)]
    pub all_exports_used: bool,
}

/// A directed edge from an importing module to an imported module.
///
/// At most one dependency exists per (origin, request) pair; re-adding the
/// same request updates the stored edge instead of duplicating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub id: u32,
    /// Request string as written in source (`"./util"`, `"lodash"`).
    pub request: String,
    pub kind: DependencyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<DependencyMeta>,
    /// One entry per call/import site, in source order.
    #[serde(default)]
    pub statements: Vec<Statement>,
    /// Importing module.
    pub origin_module_id: u32,
    /// Imported module.
    pub target_module_id: u32,
}

impl Dependency {
    pub fn new(
        request: impl Into<String>,
        kind: DependencyKind,
        origin_module_id: u32,
        target_module_id: u32,
    ) -> Self {
        Self {
            id: 0,
            request: request.into(),
            kind,
            meta: None,
            statements: Vec::new(),
            origin_module_id,
            target_module_id,
        }
    }
}
