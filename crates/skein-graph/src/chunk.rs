//! Chunk, Asset and EntryPoint entities.

use serde::{Deserialize, Serialize};

/// One bundler-emitted grouping of modules.
///
/// The id is the bundler-native chunk id, stringified; chunk ids are already
/// compact and human-meaningful ("main", "vendors~app") so they are kept as
/// the natural key instead of being re-numbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub name: String,
    pub size: u64,
    /// Present in the startup bundle (vs. loaded on demand).
    pub initial: bool,
    pub entry: bool,
    /// Member modules (internal module ids).
    #[serde(default)]
    pub modules: Vec<u32>,
    /// Emitted assets (by path).
    #[serde(default)]
    pub assets: Vec<String>,
    /// Chunks this chunk depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Async-loaded child chunks.
    #[serde(default)]
    pub imported: Vec<String>,
}

impl Chunk {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size: 0,
            initial: false,
            entry: false,
            modules: Vec::new(),
            assets: Vec::new(),
            dependencies: Vec::new(),
            imported: Vec::new(),
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_flags(mut self, initial: bool, entry: bool) -> Self {
        self.initial = initial;
        self.entry = entry;
        self
    }

    /// Idempotent membership add: re-adding a known module is a no-op.
    pub fn add_module(&mut self, module_id: u32) {
        if !self.modules.contains(&module_id) {
            self.modules.push(module_id);
        }
    }

    pub fn add_asset(&mut self, path: &str) {
        if !self.assets.iter().any(|p| p == path) {
            self.assets.push(path.to_string());
        }
    }

    pub fn add_dependency(&mut self, chunk_id: &str) {
        if !self.dependencies.iter().any(|c| c == chunk_id) {
            self.dependencies.push(chunk_id.to_string());
        }
    }

    pub fn add_imported(&mut self, chunk_id: &str) {
        if !self.imported.iter().any(|c| c == chunk_id) {
            self.imported.push(chunk_id.to_string());
        }
    }
}

/// One emitted output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: u32,
    pub path: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gzip_size: Option<u64>,
    /// Raw emitted content. Empty when content capture is disabled.
    #[serde(default)]
    pub content: String,
    /// Owning chunks.
    #[serde(default)]
    pub chunks: Vec<String>,
}

impl Asset {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            id: 0,
            path: path.into(),
            size,
            gzip_size: None,
            content: String::new(),
            chunks: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn add_chunk(&mut self, chunk_id: &str) {
        if !self.chunks.iter().any(|c| c == chunk_id) {
            self.chunks.push(chunk_id.to_string());
        }
    }
}

/// One named build entry and its aggregate output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub id: u32,
    pub name: String,
    /// Sum of member asset sizes.
    pub size: u64,
    #[serde(default)]
    pub chunks: Vec<String>,
    #[serde(default)]
    pub assets: Vec<String>,
}

impl EntryPoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            size: 0,
            chunks: Vec::new(),
            assets: Vec::new(),
        }
    }

    pub fn add_chunk(&mut self, chunk_id: &str) {
        if !self.chunks.iter().any(|c| c == chunk_id) {
            self.chunks.push(chunk_id.to_string());
        }
    }

    /// Idempotent: an asset already counted is not added (or summed) twice.
    pub fn add_asset(&mut self, path: &str, size: u64) {
        if !self.assets.iter().any(|p| p == path) {
            self.assets.push(path.to_string());
            self.size += size;
        }
    }
}
