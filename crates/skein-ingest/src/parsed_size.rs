//! Parsed-bundle size overlay.
//!
//! Best-effort enrichment: statically scan emitted bundle text for module
//! wrapper headers, attribute the byte span between consecutive wrappers to
//! the module whose render id matches, and record it as the module's parsed
//! size. Any per-asset failure (file missing, no wrappers found) logs at
//! debug level and leaves the prior value; it never aborts the build.

use regex::Regex;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use skein_graph::ModuleGraph;

/// Matches the wrapper header the bundler runtime emits before each module:
/// `/***/ "./src/a.js":` or `/***/ 142:`.
fn wrapper_regex() -> &'static Regex {
    static WRAPPER: OnceLock<Regex> = OnceLock::new();
    WRAPPER.get_or_init(|| {
        Regex::new(r#"(?m)^/\*\*\*/\s+(?:"((?:[^"\\]|\\.)*)"|(\d+)):"#)
            .expect("wrapper pattern is valid")
    })
}

/// Scan one emitted bundle's text and overlay parsed sizes onto matching
/// modules. Returns how many modules were updated.
pub fn overlay_parsed_sizes(module_graph: &ModuleGraph, asset_path: &str, bundle: &str) -> usize {
    let mut spans: Vec<(String, usize)> = Vec::new();
    for captures in wrapper_regex().captures_iter(bundle) {
        let render_id = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str().to_string());
        let Some(render_id) = render_id else { continue };
        let start = captures.get(0).map(|m| m.start()).unwrap_or(0);
        spans.push((render_id, start));
    }
    if spans.is_empty() {
        debug!(asset = asset_path, "no module wrappers found in bundle");
        return 0;
    }

    let mut sizes: FxHashMap<String, u64> = FxHashMap::default();
    for (index, (render_id, start)) in spans.iter().enumerate() {
        let end = spans
            .get(index + 1)
            .map(|(_, next_start)| *next_start)
            .unwrap_or(bundle.len());
        let size = (end - start) as u64;
        // The same wrapper id can appear in several emitted files; keep the
        // largest occurrence.
        let entry = sizes.entry(render_id.clone()).or_insert(0);
        if size > *entry {
            *entry = size;
        }
    }

    let mut updated = 0;
    for module in module_graph.modules() {
        let Some(render_id) = module.render_id.as_deref() else {
            continue;
        };
        if let Some(&size) = sizes.get(render_id) {
            if module_graph.set_parsed_size(module.id, size) {
                updated += 1;
            }
        }
    }
    debug!(asset = asset_path, updated, "parsed-size overlay applied");
    updated
}

/// Read one emitted asset from disk and overlay parsed sizes. A missing or
/// unreadable file is skipped, not fatal.
pub async fn overlay_parsed_sizes_from_disk(
    module_graph: &ModuleGraph,
    asset_path: &Path,
) -> usize {
    match tokio::fs::read_to_string(asset_path).await {
        Ok(bundle) => {
            overlay_parsed_sizes(module_graph, &asset_path.to_string_lossy(), &bundle)
        }
        Err(error) => {
            debug!(asset = %asset_path.display(), %error, "skipping unreadable bundle");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_graph::{Module, ModuleKind};

    const BUNDLE: &str = concat!(
        "(self.webpackChunk = self.webpackChunk || []).push([[143],{\n",
        "/***/ \"./src/a.js\":\n",
        "(function(module){ module.exports = 'aaaaaaaaaaaaaaaa'; })\n",
        "/***/ 271:\n",
        "(function(module){ module.exports = 'b'; })\n",
        "}]);\n",
    );

    #[test]
    fn wrapper_spans_become_parsed_sizes() {
        let graph = ModuleGraph::new();
        let a = graph.add_module(Module::new("/src/a.js", ModuleKind::Normal));
        let b = graph.add_module(Module::new("/src/b.js", ModuleKind::Normal));
        graph.update_module(a, |m| m.render_id = Some("./src/a.js".to_string()));
        graph.update_module(b, |m| m.render_id = Some("271".to_string()));

        let updated = overlay_parsed_sizes(&graph, "main.js", BUNDLE);
        assert_eq!(updated, 2);

        let a_size = graph.module_by_id(a).unwrap().size.parsed_size;
        let b_size = graph.module_by_id(b).unwrap().size.parsed_size;
        assert!(a_size > b_size);
        assert!(b_size > 0);
    }

    #[test]
    fn bundle_without_wrappers_changes_nothing() {
        let graph = ModuleGraph::new();
        let a = graph.add_module(Module::new("/src/a.js", ModuleKind::Normal));
        graph.update_module(a, |m| m.render_id = Some("./src/a.js".to_string()));

        assert_eq!(overlay_parsed_sizes(&graph, "main.js", "console.log(1)"), 0);
        assert_eq!(graph.module_by_id(a).unwrap().size.parsed_size, 0);
    }

    #[test]
    fn modules_without_render_ids_are_left_alone() {
        let graph = ModuleGraph::new();
        let a = graph.add_module(Module::new("/src/a.js", ModuleKind::Normal));

        overlay_parsed_sizes(&graph, "main.js", BUNDLE);
        assert_eq!(graph.module_by_id(a).unwrap().size.parsed_size, 0);
    }
}
