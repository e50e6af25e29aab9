//! Original-source capture from disk.
//!
//! Reads module files to fill in `original_source` for modules that did not
//! receive one from the source-map patch. Reads run concurrently across
//! modules with a soft per-file timeout so one unreadable or hung file does
//! not stall the pipeline; failures skip the module and continue.

use std::time::Duration;

use tokio::task::JoinSet;
use tracing::debug;

use skein_graph::ModuleGraph;

/// Default soft deadline for one file read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Fill `original_source` from disk for every module that lacks one.
/// Returns the number of modules enriched. Must complete before the build
/// is sealed and handed to consumers.
pub async fn capture_original_sources(module_graph: &ModuleGraph, timeout: Duration) -> usize {
    let mut reads: JoinSet<(u32, Option<String>)> = JoinSet::new();

    for module in module_graph.modules() {
        if module.original_source.is_some() {
            continue;
        }
        let path = file_path_of(&module.path);
        let module_id = module.id;
        reads.spawn(async move {
            let read = tokio::time::timeout(timeout, tokio::fs::read_to_string(&path)).await;
            match read {
                Ok(Ok(text)) => (module_id, Some(text)),
                Ok(Err(error)) => {
                    debug!(path, %error, "skipping unreadable module source");
                    (module_id, None)
                }
                Err(_) => {
                    debug!(path, "module source read timed out");
                    (module_id, None)
                }
            }
        });
    }

    let mut enriched = 0;
    while let Some(joined) = reads.join_next().await {
        let Ok((module_id, text)) = joined else {
            continue;
        };
        if let Some(text) = text {
            if module_graph.update_module(module_id, |m| m.original_source = Some(text.clone())) {
                enriched += 1;
            }
        }
    }
    enriched
}

/// Strip the layer suffix a multi-config build appends to the path; the
/// filesystem knows nothing about layers.
fn file_path_of(module_path: &str) -> String {
    match module_path.find(" (") {
        Some(idx) => module_path[..idx].to_string(),
        None => module_path.to_string(),
    }
}
