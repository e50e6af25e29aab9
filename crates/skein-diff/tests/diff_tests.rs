//! Integration tests for the diff engine over hand-built and ingested
//! snapshots.

use skein_diff::{AssetClass, DiffState, Section, diff};
use skein_graph::{Asset, Chunk, ChunkGraph, Module, ModuleGraph, ModuleKind, ModuleSize,
    PackageGraph, PackageMeta};
use skein_ingest::{BuildSnapshot, GraphSource, ModulePatch, PatchSource};

/// Builds one sealed snapshot with a startup chunk (`main`, initial) and an
/// on-demand chunk (`lazy`). Each asset is linked to one of the two.
fn build(name: &str, assets: &[(&str, u64, bool)], modules: &[(&str, u64)]) -> BuildSnapshot {
    let module_graph = ModuleGraph::new();
    for (path, size) in modules {
        let mut module = Module::new(*path, ModuleKind::Normal).with_size(ModuleSize {
            source_size: *size,
            transformed_size: *size,
            parsed_size: 0,
        });
        if let Some(meta) = PackageMeta::from_module_path(path) {
            module = module.with_package(meta);
        }
        module_graph.add_module(module);
    }

    let chunk_graph = ChunkGraph::new();
    let mut main = Chunk::new("main", "main");
    main.initial = true;
    chunk_graph.add_chunk(main);
    chunk_graph.add_chunk(Chunk::new("lazy", "lazy"));
    for (path, size, initial) in assets {
        chunk_graph.add_asset(Asset::new(*path, *size));
        chunk_graph.link_chunk_asset(if *initial { "main" } else { "lazy" }, path);
    }

    let package_graph = PackageGraph::from_module_graph(&module_graph, None);
    BuildSnapshot {
        name: name.to_string(),
        module_graph,
        chunk_graph,
        package_graph: Some(package_graph),
    }
}

#[test]
fn a_build_diffed_against_itself_is_all_equal() {
    let snapshot = build(
        "web",
        &[("main.8f3a9c21.js", 1000, true), ("styles.ab12cd34.css", 200, true)],
        &[("/src/index.js", 500), ("/node_modules/left-pad/index.js", 100)],
    );

    let result = diff(&snapshot, &snapshot);
    for class in &result.classes {
        assert_eq!(class.total.state, DiffState::Equal, "class {}", class.class);
        assert_eq!(class.total.percent, 0.0);
        assert_eq!(class.initial.state, DiffState::Equal);
        assert_eq!(class.initial.percent, 0.0);
    }
    for entry in &result.assets {
        assert_eq!(entry.size.state, DiffState::Equal);
        assert_eq!(entry.size.percent, 0.0);
    }
    assert!(result.modules.added.is_empty());
    assert!(result.modules.removed.is_empty());
    assert_eq!(result.modules.size.state, DiffState::Equal);

    let packages = result.packages.as_available().unwrap();
    assert!(packages.entries.iter().all(|e| e.state == DiffState::Equal));
    assert_eq!(packages.duplicates.baseline, packages.duplicates.current);
}

#[test]
fn hashed_renames_match_and_report_relative_growth() {
    let baseline = build("base", &[("main.aaa111.js", 1000, true)], &[]);
    let current = build("head", &[("main.bbb222.js", 1200, true)], &[]);

    let result = diff(&baseline, &current);

    let js_entries: Vec<_> = result
        .assets
        .iter()
        .filter(|e| e.class == AssetClass::Js)
        .collect();
    assert_eq!(js_entries.len(), 1);
    assert_eq!(js_entries[0].name, "main.js");
    assert_eq!(js_entries[0].size.state, DiffState::Changed);
    assert_eq!(js_entries[0].size.percent, 20.0);

    let js_class = result
        .classes
        .iter()
        .find(|c| c.class == AssetClass::Js)
        .unwrap();
    assert_eq!(js_class.total.baseline, 1000);
    assert_eq!(js_class.total.current, 1200);
    assert_eq!(js_class.initial.state, DiffState::Changed);
}

#[test]
fn one_sided_assets_are_added_and_removed() {
    let baseline = build("base", &[("old.css", 300, true)], &[]);
    let current = build("head", &[("new.css", 400, true)], &[]);

    let result = diff(&baseline, &current);
    let added = result.assets.iter().find(|e| e.name == "new.css").unwrap();
    assert_eq!(added.size.state, DiffState::Added);
    assert!(added.size.percent.is_infinite());

    let removed = result.assets.iter().find(|e| e.name == "old.css").unwrap();
    assert_eq!(removed.size.state, DiffState::Removed);
    assert_eq!(removed.size.percent, -100.0);
}

#[test]
fn initial_bucket_only_counts_startup_chunks() {
    let snapshot = build(
        "web",
        &[("main.js", 600, true), ("extra.js", 250, false)],
        &[],
    );

    let result = diff(&snapshot, &snapshot);
    let js = result
        .classes
        .iter()
        .find(|c| c.class == AssetClass::Js)
        .unwrap();
    assert_eq!(js.total.baseline, 850);
    assert_eq!(js.initial.baseline, 600);
}

#[test]
fn module_path_sets_are_compared_after_deduplication() {
    let baseline = build("base", &[], &[("/src/a.js", 100), ("/src/b.js", 200)]);
    let current = build("head", &[], &[("/src/b.js", 200), ("/src/c.js", 50)]);

    let result = diff(&baseline, &current);
    assert_eq!(result.modules.baseline_count, 2);
    assert_eq!(result.modules.current_count, 2);
    assert_eq!(result.modules.added, vec!["/src/c.js"]);
    assert_eq!(result.modules.removed, vec!["/src/a.js"]);
    assert_eq!(result.modules.size.baseline, 300);
    assert_eq!(result.modules.size.current, 250);
    assert_eq!(result.modules.size.state, DiffState::Changed);
}

#[test]
fn package_changes_and_duplicates_are_reported_per_side() {
    let baseline = build("base", &[], &[("/node_modules/left-pad/index.js", 100)]);
    let current = build(
        "head",
        &[],
        &[
            ("/node_modules/left-pad/index.js", 100),
            ("/app/node_modules/left-pad/index.js", 100),
        ],
    );

    let result = diff(&baseline, &current);
    let packages = result.packages.as_available().unwrap();
    let entry = packages.entries.iter().find(|e| e.name == "left-pad").unwrap();
    assert_eq!(entry.state, DiffState::Changed);
    assert_eq!(entry.baseline.len(), 1);
    assert_eq!(entry.current.len(), 2);

    assert_eq!(packages.duplicates.baseline, 0);
    assert_eq!(packages.duplicates.current, 1);
}

#[test]
fn package_section_degrades_when_one_side_lacks_it() {
    let baseline = build("base", &[("main.js", 100, true)], &[("/src/a.js", 100)]);
    let mut current = build("head", &[("main.js", 120, true)], &[("/src/a.js", 120)]);
    current.package_graph = None;

    let result = diff(&baseline, &current);
    assert_eq!(result.packages, Section::Unavailable);
    // Everything else still diffs.
    assert_eq!(result.assets.len(), 1);
    assert_eq!(result.assets[0].size.state, DiffState::Changed);
    assert_eq!(result.modules.size.current, 120);
}

#[tokio::test]
async fn ingested_builds_diff_end_to_end() {
    let mut base_source = PatchSource::new("base");
    base_source.apply_module_patch(
        serde_json::from_value::<ModulePatch>(serde_json::json!({
            "modules": [
                { "id": 1, "path": "/src/index.js", "transformedSize": 700 },
                { "id": 3, "path": "/node_modules/left-pad/index.js",
                  "transformedSize": 300 }
            ]
        }))
        .unwrap(),
    );
    let mut head_source = PatchSource::new("head");
    head_source.apply_module_patch(
        serde_json::from_value::<ModulePatch>(serde_json::json!({
            "modules": [
                { "id": 1, "path": "/src/index.js", "transformedSize": 800 },
                { "id": 2, "path": "/src/feature.js", "transformedSize": 100 },
                { "id": 3, "path": "/node_modules/left-pad/index.js",
                  "transformedSize": 300 }
            ]
        }))
        .unwrap(),
    );

    let baseline = base_source.build().await.unwrap();
    let current = head_source.build().await.unwrap();

    let result = diff(&baseline, &current);
    assert_eq!(result.modules.added, vec!["/src/feature.js"]);
    assert_eq!(result.modules.size.baseline, 1000);
    assert_eq!(result.modules.size.current, 1200);
    assert_eq!(result.modules.size.percent, 20.0);
    assert!(result.packages.is_available());

    // Serializes for the comparison view without loss.
    let json = result.to_json().unwrap();
    assert!(json.contains("\"status\": \"available\""));
}
