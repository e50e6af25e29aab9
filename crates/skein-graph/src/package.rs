//! Package entity and package-identity resolution from module paths.

use serde::{Deserialize, Serialize};

/// Resolved npm package identity for a module: (name, version, install root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageMeta {
    pub name: String,
    pub version: String,
    /// Directory the package instance is installed in (the `node_modules/<name>`
    /// directory itself).
    pub root: String,
}

impl PackageMeta {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        root: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            root: root.into(),
        }
    }

    /// Derive name and install root from a module file path by locating its
    /// innermost `node_modules/<name>` segment. Scoped packages span two path
    /// segments. Returns `None` for first-party modules and for paths where
    /// the root cannot be resolved (e.g. a bare symlink target); such modules
    /// stay in the module graph but join no package.
    ///
    /// The version is not recoverable from the path alone; callers overlay it
    /// from build metadata when known.
    pub fn from_module_path(path: &str) -> Option<Self> {
        let normalized = path.replace('\\', "/");
        let marker = "node_modules/";
        let idx = normalized.rfind(marker)?;
        let after = &normalized[idx + marker.len()..];
        let mut segments = after.split('/');
        let first = segments.next().filter(|s| !s.is_empty())?;
        let name = if let Some(scope) = first.strip_prefix('@').map(|_| first) {
            let second = segments.next().filter(|s| !s.is_empty())?;
            format!("{scope}/{second}")
        } else {
            first.to_string()
        };
        let root = format!("{}{}{}", &normalized[..idx], marker, name);
        Some(Self {
            name,
            version: String::new(),
            root,
        })
    }
}

/// One resolved npm package instance with its member modules.
///
/// `duplicates` lists sibling packages that share the name but differ in
/// version or install root. It is always present, possibly empty; consumers
/// rely on the field existing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: u32,
    pub name: String,
    pub version: String,
    pub root: String,
    /// Aggregate size of member modules.
    pub size: u64,
    #[serde(default)]
    pub modules: Vec<u32>,
    #[serde(default)]
    pub duplicates: Vec<u32>,
}

impl Package {
    pub fn new(meta: &PackageMeta) -> Self {
        Self {
            id: 0,
            name: meta.name.clone(),
            version: meta.version.clone(),
            root: meta.root.clone(),
            size: 0,
            modules: Vec::new(),
            duplicates: Vec::new(),
        }
    }
}
