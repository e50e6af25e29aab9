//! Structured patch events emitted incrementally during compilation.
//!
//! Shapes follow the compiler-plugin payloads: camelCase field names,
//! bundler-native integer ids for modules, native (possibly numeric) ids for
//! chunks. Every event type is idempotent-additive.

use serde::{Deserialize, Serialize};

/// A bundler-native chunk id: numeric or named depending on configuration.
/// Stored stringified, which is also how the chunk graph keys chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NativeChunkId {
    Number(u64),
    Text(String),
}

impl NativeChunkId {
    pub fn as_string(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for NativeChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One module as reported by the compiler hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModule {
    pub id: u64,
    pub path: String,
    #[serde(default)]
    pub layer: Option<String>,
    #[serde(default)]
    pub is_entry: bool,
    /// Native ids of constituent modules when this is a concatenation.
    #[serde(default)]
    pub concatenated: Vec<u64>,
    #[serde(default)]
    pub source_size: u64,
    #[serde(default)]
    pub transformed_size: u64,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub transformed: Option<String>,
    #[serde(default)]
    pub bailout_reasons: Vec<String>,
    /// Resolved package version, when the hook read the package manifest.
    #[serde(default)]
    pub package_version: Option<String>,
}

/// One source location attached to a dependency site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatementLoc {
    pub start_line: u32,
    #[serde(default)]
    pub start_column: Option<u32>,
    #[serde(default)]
    pub end_line: Option<u32>,
    #[serde(default)]
    pub end_column: Option<u32>,
}

/// One dependency edge between two native module ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDependency {
    pub from: u64,
    pub to: u64,
    pub request: String,
    /// Raw dependency-type string; classified into the closed kind enum.
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub statements: Vec<RawStatementLoc>,
}

/// Chunk membership rows: which native modules a chunk contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChunkModules {
    pub chunk: NativeChunkId,
    pub modules: Vec<u64>,
}

/// Structural module patch: existence and interconnection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePatch {
    #[serde(default)]
    pub modules: Vec<RawModule>,
    #[serde(default)]
    pub dependencies: Vec<RawDependency>,
    #[serde(default)]
    pub chunk_modules: Vec<RawChunkModules>,
}

/// One chunk as reported by the compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChunk {
    pub id: NativeChunkId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub initial: bool,
    #[serde(default)]
    pub entry: bool,
    #[serde(default)]
    pub dependencies: Vec<NativeChunkId>,
    #[serde(default)]
    pub imported: Vec<NativeChunkId>,
}

/// One named entry and its chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntryPoint {
    pub name: String,
    #[serde(default)]
    pub chunks: Vec<NativeChunkId>,
}

/// Structural chunk patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkPatch {
    #[serde(default)]
    pub chunks: Vec<RawChunk>,
    #[serde(default)]
    pub entrypoints: Vec<RawEntryPoint>,
}

/// One emitted asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAsset {
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub gzip_size: Option<u64>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Asset-to-chunk ownership rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChunkAssets {
    pub chunk: NativeChunkId,
    pub assets: Vec<String>,
}

/// Asset-to-entrypoint membership rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntryPointAssets {
    pub name: String,
    pub assets: Vec<String>,
}

/// Asset patch: emitted files and their ownership.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPatch {
    #[serde(default)]
    pub assets: Vec<RawAsset>,
    #[serde(default)]
    pub chunk_assets: Vec<RawChunkAssets>,
    #[serde(default)]
    pub entrypoint_assets: Vec<RawEntryPointAssets>,
}

/// Runtime render-id assignment rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModuleId {
    pub module: u64,
    pub render_id: String,
}

/// Detail patch: render ids assigned by the bundler runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleIdPatch {
    #[serde(default)]
    pub module_ids: Vec<RawModuleId>,
}

/// Pre-transform source rows recovered from source maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModuleSource {
    pub module: u64,
    pub source: String,
}

/// Detail patch: original sources per module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSourcePatch {
    #[serde(default)]
    pub module_original_sources: Vec<RawModuleSource>,
}
