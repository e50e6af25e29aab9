//! Chunk graph membership and snapshot behavior.

use crate::{Asset, Chunk, ChunkGraph, DataMode, EntryPoint};

#[test]
fn chunk_membership_adds_are_idempotent() {
    let graph = ChunkGraph::new();
    graph.set_chunks(vec![Chunk::new("main", "main").with_flags(true, true)]);

    graph.update_chunk("main", |chunk| {
        chunk.add_module(1);
        chunk.add_module(1);
        chunk.add_asset("main.js");
        chunk.add_asset("main.js");
    });

    let chunk = graph.chunk_by_id("main").unwrap();
    assert_eq!(chunk.modules, vec![1]);
    assert_eq!(chunk.assets, vec!["main.js"]);
}

#[test]
fn chunk_for_module_finds_first_containing_chunk() {
    let graph = ChunkGraph::new();
    let mut main = Chunk::new("main", "main");
    main.add_module(1);
    let mut vendor = Chunk::new("vendor", "vendor");
    vendor.add_module(1);
    vendor.add_module(2);
    graph.set_chunks(vec![main, vendor]);

    assert_eq!(graph.chunk_for_module(1).unwrap().id, "main");
    assert_eq!(graph.chunk_for_module(2).unwrap().id, "vendor");
    assert!(graph.chunk_for_module(3).is_none());
}

#[test]
fn assets_are_deduplicated_by_path() {
    let graph = ChunkGraph::new();
    let first = graph.add_asset(Asset::new("main.js", 1000));
    let second = graph.add_asset(Asset::new("main.js", 2000));
    assert_eq!(first, second);
    assert_eq!(graph.asset_count(), 1);
    // The original record wins.
    assert_eq!(graph.asset_by_path("main.js").unwrap().size, 1000);
}

#[test]
fn entry_points_aggregate_member_asset_sizes() {
    let graph = ChunkGraph::new();
    let id = graph.add_entry_point(EntryPoint::new("app"));
    graph.update_entry_point(id, |entry| {
        entry.add_asset("app.js", 1200);
        entry.add_asset("app.css", 300);
        // Re-adding does not double-count.
        entry.add_asset("app.js", 1200);
    });

    let entry = graph.entry_point_by_id(id).unwrap();
    assert_eq!(entry.size, 1500);
    assert_eq!(entry.assets.len(), 2);

    // Entry points are keyed by name.
    let again = graph.add_entry_point(EntryPoint::new("app"));
    assert_eq!(again, id);
}

#[test]
fn chunk_asset_links_are_bidirectional() {
    let graph = ChunkGraph::new();
    graph.set_chunks(vec![Chunk::new("main", "main")]);
    graph.add_asset(Asset::new("main.abc123.js", 1000));

    graph.link_chunk_asset("main", "main.abc123.js");

    assert_eq!(graph.chunk_by_id("main").unwrap().assets, vec!["main.abc123.js"]);
    assert_eq!(
        graph.asset_by_path("main.abc123.js").unwrap().chunks,
        vec!["main"]
    );
}

#[test]
fn lite_snapshot_drops_asset_content() {
    let graph = ChunkGraph::new();
    graph.add_asset(Asset::new("main.js", 10).with_content("console.log(1)"));

    let full = graph.to_data(DataMode::Full);
    assert_eq!(full.assets[0].content, "console.log(1)");

    let lite = graph.to_data(DataMode::Lite);
    assert!(lite.assets[0].content.is_empty());
    // Structural fields survive.
    assert_eq!(lite.assets[0].size, 10);
}

#[test]
fn duplicate_modules_across_chunks_are_reported() {
    let graph = ChunkGraph::new();
    let mut a = Chunk::new("a", "a");
    a.add_module(1);
    a.add_module(2);
    let mut b = Chunk::new("b", "b");
    b.add_module(2);
    graph.set_chunks(vec![a, b]);

    let duplicated = graph.duplicate_modules_across_chunks();
    assert_eq!(duplicated.len(), 1);
    assert_eq!(duplicated[0].0, 2);
    assert_eq!(duplicated[0].1, vec!["a", "b"]);
}
