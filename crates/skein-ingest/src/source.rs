//! The ingestion capability shared by all builder paths.

use async_trait::async_trait;

use crate::snapshot::BuildSnapshot;
use crate::Result;

/// One way of producing a build graph.
///
/// Both ingestion paths (structured patch events, monolithic stats snapshot)
/// implement this trait and produce the same target graph shape, so a third
/// input format slots in without touching the graphs themselves.
///
/// `build` finalizes the source: it runs the post-ingestion cleanup passes,
/// derives the package view and seals the graphs. A source is single-use;
/// callers sequence patch application before calling `build` (single writer
/// per build, no internal lock ordering).
#[async_trait]
pub trait GraphSource: Send {
    async fn build(&mut self) -> Result<BuildSnapshot>;
}
