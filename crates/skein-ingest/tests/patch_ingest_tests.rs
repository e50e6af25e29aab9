//! Integration tests for the patch-event ingestion path.

use skein_ingest::{
    AssetPatch, ChunkPatch, GraphSource, ModuleIdPatch, ModulePatch, ModuleSourcePatch,
    PatchSource,
};

fn module_patch_json() -> ModulePatch {
    serde_json::from_value(serde_json::json!({
        "modules": [
            { "id": 1001, "path": "/repo/src/index.js", "isEntry": true,
              "sourceSize": 120, "transformedSize": 140 },
            { "id": 1002, "path": "/repo/src/util.js",
              "sourceSize": 80, "transformedSize": 90,
              "bailoutReasons": [
                  "ModuleConcatenation bailout: Module is referenced from these modules with unsupported syntax",
                  "CommonJS function require() prevents optimization"
              ] },
            { "id": 1003, "path": "/repo/node_modules/lodash/flatten.js",
              "sourceSize": 300, "transformedSize": 310,
              "packageVersion": "4.17.21" }
        ],
        "dependencies": [
            { "from": 1001, "to": 1002, "request": "./util", "kind": "harmony import",
              "statements": [{ "startLine": 2, "startColumn": 0 }] },
            { "from": 1001, "to": 1003, "request": "lodash", "kind": "cjs require" },
            { "from": 1001, "to": 9999, "request": "./ghost", "kind": "harmony import" }
        ],
        "chunkModules": [
            { "chunk": "main", "modules": [1001, 1002, 1003] }
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn patch_stream_builds_a_complete_snapshot() {
    let mut source = PatchSource::new("web").with_root_path("/repo");
    source.apply_module_patch(module_patch_json());
    source.apply_chunk_patch(
        serde_json::from_value::<ChunkPatch>(serde_json::json!({
            "chunks": [
                { "id": "main", "name": "main", "size": 540, "initial": true, "entry": true }
            ],
            "entrypoints": [ { "name": "main", "chunks": ["main"] } ]
        }))
        .unwrap(),
    );
    source.apply_asset_patch(
        serde_json::from_value::<AssetPatch>(serde_json::json!({
            "assets": [ { "path": "main.abc123.js", "size": 540 } ],
            "chunkAssets": [ { "chunk": "main", "assets": ["main.abc123.js"] } ],
            "entrypointAssets": [ { "name": "main", "assets": ["main.abc123.js"] } ]
        }))
        .unwrap(),
    );

    let snapshot = source.build().await.unwrap();
    let summary = snapshot.summary();
    assert_eq!(summary.modules, 3);
    // The edge to the unregistered native id 9999 was skipped.
    assert_eq!(summary.dependencies, 2);
    assert_eq!(summary.chunks, 1);
    assert_eq!(summary.assets, 1);
    assert_eq!(summary.packages, 1);

    let entry = snapshot
        .module_graph
        .module_by_file("/repo/src/index.js")
        .unwrap();
    assert!(entry.is_entry);
    assert_eq!(entry.dependencies.len(), 2);
    assert_eq!(entry.chunks, vec!["main"]);

    // Internal concatenation bookkeeping was filtered from bailout reasons.
    let util = snapshot
        .module_graph
        .module_by_file("/repo/src/util.js")
        .unwrap();
    assert_eq!(
        util.bailout_reasons,
        vec!["CommonJS function require() prevents optimization"]
    );

    // The package view picked up the manifest version and stripped the root.
    let packages = snapshot.package_graph.as_ref().unwrap().to_data();
    assert_eq!(packages[0].name, "lodash");
    assert_eq!(packages[0].version, "4.17.21");
    assert_eq!(packages[0].root, "/node_modules/lodash");

    let entrypoints = snapshot.chunk_graph.entry_points();
    assert_eq!(entrypoints.len(), 1);
    assert_eq!(entrypoints[0].size, 540);
}

#[tokio::test]
async fn reapplying_a_structural_patch_changes_nothing() {
    let mut source = PatchSource::new("web");
    let patch = module_patch_json();
    source.apply_module_patch(patch.clone());
    let once = source.build().await.unwrap().summary();

    source.apply_module_patch(patch);
    let twice = source.build().await.unwrap().summary();

    assert_eq!(once.modules, twice.modules);
    assert_eq!(once.dependencies, twice.dependencies);
    assert_eq!(once.chunks, twice.chunks);
}

#[tokio::test]
async fn detail_patches_for_unknown_modules_are_dropped() {
    let mut source = PatchSource::new("web");
    source.apply_module_patch(module_patch_json());

    source.apply_module_id_patch(
        serde_json::from_value::<ModuleIdPatch>(serde_json::json!({
            "moduleIds": [
                { "module": 1001, "renderId": "./src/index.js" },
                { "module": 4242, "renderId": "./missing.js" }
            ]
        }))
        .unwrap(),
    );
    source.apply_module_source_patch(
        serde_json::from_value::<ModuleSourcePatch>(serde_json::json!({
            "moduleOriginalSources": [
                { "module": 1002, "source": "export const u = 1;" },
                { "module": 4242, "source": "never stored" }
            ]
        }))
        .unwrap(),
    );

    let snapshot = source.build().await.unwrap();
    assert_eq!(
        snapshot
            .module_graph
            .module_by_file("/repo/src/index.js")
            .unwrap()
            .render_id
            .as_deref(),
        Some("./src/index.js")
    );
    assert_eq!(
        snapshot
            .module_graph
            .module_by_file("/repo/src/util.js")
            .unwrap()
            .original_source
            .as_deref(),
        Some("export const u = 1;")
    );
    // Still three modules; nothing was created for the unknown native ids.
    assert_eq!(snapshot.summary().modules, 3);
}

#[tokio::test]
async fn package_view_is_absent_without_package_metadata() {
    let mut source = PatchSource::new("web");
    source.apply_module_patch(
        serde_json::from_value::<ModulePatch>(serde_json::json!({
            "modules": [
                { "id": 1, "path": "/src/app.js" },
                { "id": 2, "path": "/src/util.js" }
            ]
        }))
        .unwrap(),
    );

    let snapshot = source.build().await.unwrap();
    // No module lives under node_modules, so the view degrades to absent.
    assert!(snapshot.package_graph.is_none());
    assert_eq!(snapshot.summary().packages, 0);
}

#[tokio::test]
async fn concatenation_links_are_applied_in_both_directions() {
    let mut source = PatchSource::new("web");
    source.apply_module_patch(
        serde_json::from_value::<ModulePatch>(serde_json::json!({
            "modules": [
                { "id": 1, "path": "/fused.js", "concatenated": [2, 3],
                  "transformedSize": 700 },
                { "id": 2, "path": "/c1.js", "transformedSize": 400 },
                { "id": 3, "path": "/c2.js", "transformedSize": 300 }
            ]
        }))
        .unwrap(),
    );

    let snapshot = source.build().await.unwrap();
    let parent = snapshot.module_graph.module_by_file("/fused.js").unwrap();
    assert_eq!(parent.kind, skein_graph::ModuleKind::Concatenation);
    assert_eq!(parent.concatenation_children.len(), 2);

    let child = snapshot.module_graph.module_by_file("/c1.js").unwrap();
    assert!(child.is_concatenated_into(parent.id));

    // Rollup counts the fused group once.
    let ids = [parent.id, child.id];
    assert_eq!(snapshot.module_graph.effective_size_of(&ids), 700);
}

#[tokio::test]
async fn style_only_edges_are_cleaned_during_finalization() {
    let mut source = PatchSource::new("web");
    source.apply_module_patch(
        serde_json::from_value::<ModulePatch>(serde_json::json!({
            "modules": [
                { "id": 1, "path": "/src/app.js" },
                { "id": 2, "path": "/src/theme.css" }
            ],
            "dependencies": [
                { "from": 1, "to": 2, "request": "./theme.css", "kind": "harmony import" }
            ]
        }))
        .unwrap(),
    );

    let snapshot = source.build().await.unwrap();
    assert_eq!(snapshot.summary().dependencies, 0);
    assert_eq!(snapshot.summary().modules, 2);
}
