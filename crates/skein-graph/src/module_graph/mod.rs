//! In-memory module graph.
//!
//! HashMap/IndexMap-based storage behind an `Arc<RwLock>` handle. Entities
//! are returned as `Arc` clones; mutation clones out of the `Arc`, updates,
//! and reinserts, so readers never observe a half-applied change.

mod cleanup;
mod graph;
mod mutations;
mod queries;
mod serialization;

pub use graph::ModuleGraph;
pub use serialization::ModuleGraphData;
