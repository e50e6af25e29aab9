//! Post-ingestion edge cleanup.

use tracing::debug;

use super::graph::ModuleGraph;

impl ModuleGraph {
    /// Strip style-only dependency edges from the adjacency.
    ///
    /// A stylesheet import produces an asset but contributes no executable
    /// module; keeping its edge would pollute dependency-based statistics.
    /// Invoked once after ingestion completes. Target modules are identified
    /// as style files with no outgoing dependencies of their own; the modules
    /// themselves stay in the graph, only the edges go.
    pub fn remove_no_import_style(&self) {
        let mut inner = self.inner.write();

        let style_targets: Vec<u32> = inner
            .modules
            .values()
            .filter(|m| m.is_style_only() && m.dependencies.is_empty())
            .map(|m| m.id)
            .collect();
        if style_targets.is_empty() {
            return;
        }

        let doomed: Vec<(u32, u32, String)> = inner
            .dependencies
            .values()
            .filter(|dep| style_targets.contains(&dep.target_module_id))
            .map(|dep| (dep.id, dep.origin_module_id, dep.request.clone()))
            .collect();

        debug!(edges = doomed.len(), "removing style-only dependency edges");

        for (dep_id, origin, request) in &doomed {
            inner.dependencies.shift_remove(dep_id);
            inner.dependency_index.remove(&(*origin, request.clone()));
            Self::update_module_in(&mut inner, *origin, |m| {
                m.dependencies.retain(|d| d != dep_id);
            });
        }
        for target in style_targets {
            Self::update_module_in(&mut inner, target, |m| {
                m.imported_by.clear();
            });
        }
    }
}
