//! Module graph behavior: identity, idempotency, edges, concatenation,
//! re-export chains, style-edge cleanup.

use std::sync::Arc;

use crate::{
    DataMode, Dependency, DependencyKind, ExportInfo, Module, ModuleGraph, ModuleGraphModule,
    ModuleKind, ModuleSize,
};

fn module(path: &str) -> Module {
    Module::new(path, ModuleKind::Normal)
}

#[test]
fn adding_the_same_module_twice_is_idempotent() {
    let graph = ModuleGraph::new();
    let first = graph.add_module(module("/src/a.js").with_native_id(100));
    let second = graph.add_module(module("/src/a.js").with_native_id(100));
    assert_eq!(first, second);
    assert_eq!(graph.module_count(), 1);

    // Same path, no native id: still deduplicated by path.
    let third = graph.add_module(module("/src/a.js"));
    assert_eq!(first, third);
    assert_eq!(graph.module_count(), 1);
}

#[test]
fn path_dedup_learns_a_late_native_id() {
    let graph = ModuleGraph::new();
    let id = graph.add_module(module("/src/a.js"));
    let again = graph.add_module(module("/src/a.js").with_native_id(77));
    assert_eq!(id, again);

    // Detail mutations addressed by the late native id reach the module.
    assert_eq!(graph.module_by_native_id(77).unwrap().id, id);
    assert!(graph.set_render_id(77, "./src/a.js"));
    assert_eq!(
        graph.module_by_id(id).unwrap().render_id.as_deref(),
        Some("./src/a.js")
    );
}

#[test]
fn module_ids_are_stable_within_a_build() {
    let graph = ModuleGraph::new();
    let id = graph.add_module(module("/src/a.js"));
    let first = graph.module_by_id(id).unwrap();
    let second = graph.module_by_id(id).unwrap();
    // Repeated lookups hand out the same shared instance.
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn dependency_links_forward_and_reverse_edges() {
    let graph = ModuleGraph::new();
    let a = graph.add_module(module("/a.js").with_native_id(1));
    let b = graph.add_module(module("/b.js").with_native_id(2));

    let dep_id = graph
        .add_dependency(Dependency::new(
            "./b",
            DependencyKind::classify("import"),
            a,
            b,
        ))
        .unwrap();

    let origin = graph.module_by_id(a).unwrap();
    assert_eq!(origin.dependencies.len(), 1);
    let dep = graph.dependency_by_id(dep_id).unwrap();
    assert_eq!(dep.kind, DependencyKind::ImportStatement);
    assert_eq!(dep.target_module_id, b);

    let target = graph.module_by_id(b).unwrap();
    assert_eq!(target.imported_by, vec![dep_id]);
}

#[test]
fn readding_a_request_updates_instead_of_duplicating() {
    let graph = ModuleGraph::new();
    let a = graph.add_module(module("/a.js"));
    let b = graph.add_module(module("/b.js"));

    let first = graph
        .add_dependency(Dependency::new("./b", DependencyKind::Unknown, a, b))
        .unwrap();
    let second = graph
        .add_dependency(Dependency::new(
            "./b",
            DependencyKind::ImportStatement,
            a,
            b,
        ))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(graph.dependency_count(), 1);
    assert_eq!(
        graph.dependency_by_id(first).unwrap().kind,
        DependencyKind::ImportStatement
    );
}

#[test]
fn dependency_with_unknown_endpoint_is_skipped() {
    let graph = ModuleGraph::new();
    let a = graph.add_module(module("/a.js"));
    assert!(
        graph
            .add_dependency(Dependency::new("./ghost", DependencyKind::Unknown, a, 999))
            .is_none()
    );
    assert_eq!(graph.dependency_count(), 0);
}

#[test]
fn lookups_return_none_for_absent_entities() {
    let graph = ModuleGraph::new();
    assert!(graph.module_by_id(7).is_none());
    assert!(graph.module_by_native_id(7).is_none());
    assert!(graph.module_by_file("/nope.js").is_none());
    assert!(graph.dependency_by_id(7).is_none());
    assert!(graph.module_graph_module(7).is_none());
}

#[test]
fn modules_snapshot_preserves_insertion_order() {
    let graph = ModuleGraph::new();
    for path in ["/z.js", "/a.js", "/m.js"] {
        graph.add_module(module(path));
    }
    let paths: Vec<String> = graph.modules().iter().map(|m| m.path.clone()).collect();
    assert_eq!(paths, vec!["/z.js", "/a.js", "/m.js"]);
}

#[test]
fn path_rewrite_enforces_uniqueness() {
    let graph = ModuleGraph::new();
    let a = graph.add_module(module("/home/ci/repo/src/a.js"));
    let b = graph.add_module(module("/home/ci/repo/src/b.js"));

    graph.set_path(a, "src/a.js").unwrap();
    assert!(graph.module_by_file("src/a.js").is_some());
    assert!(graph.module_by_file("/home/ci/repo/src/a.js").is_none());

    // Rewriting b onto a's path must fail.
    assert!(graph.set_path(b, "src/a.js").is_err());
}

#[test]
fn concatenation_rollup_counts_the_parent_once() {
    let graph = ModuleGraph::new();
    let parent = graph.add_module(
        Module::new("/fused.js", ModuleKind::Concatenation).with_size(ModuleSize {
            source_size: 0,
            transformed_size: 900,
            parsed_size: 800,
        }),
    );
    let c1 = graph.add_module(module("/c1.js").with_size(ModuleSize {
        source_size: 400,
        transformed_size: 500,
        parsed_size: 0,
    }));
    let c2 = graph.add_module(module("/c2.js").with_size(ModuleSize {
        source_size: 300,
        transformed_size: 400,
        parsed_size: 0,
    }));
    graph.set_concatenation_children(parent, &[c1, c2]);

    // Back-links exist on the constituents.
    assert!(graph.module_by_id(c1).unwrap().is_concatenated_into(parent));

    // Parent's size is authoritative; constituents contribute nothing.
    assert_eq!(graph.effective_size_of(&[parent, c1, c2]), 800);
    // A constituent on its own (parent absent from the set) still counts.
    assert_eq!(graph.effective_size_of(&[c1]), 500);
}

#[test]
fn final_export_walks_re_export_chains() {
    let graph = ModuleGraph::new();
    let terminal = graph.add_export_info(ExportInfo::new("flatten"));
    let middle = graph.add_export_info(ExportInfo::new("flatten").with_from(terminal));
    let head = graph.add_export_info(ExportInfo::new("flatten").with_from(middle));

    let resolved = graph.final_export(head).unwrap();
    assert_eq!(resolved.id, terminal);
    assert!(resolved.from.is_none());
}

#[test]
fn cyclic_re_export_chain_yields_no_terminal() {
    let graph = ModuleGraph::new();
    let a = graph.add_export_info(ExportInfo::new("x"));
    let b = graph.add_export_info(ExportInfo::new("x").with_from(a));
    // Malformed input: close the cycle.
    {
        let mut inner = graph.inner.write();
        let entry = inner.exports.get_mut(&a).unwrap();
        entry.from = Some(b);
    }
    assert!(graph.final_export(a).is_none());
    assert!(graph.final_export(b).is_none());
}

#[test]
fn module_graph_module_attaches_one_to_one() {
    let graph = ModuleGraph::new();
    let a = graph.add_module(module("/a.js"));
    let export_id = graph.add_export_info(ExportInfo::new("main"));

    let mut mgm = ModuleGraphModule::new(a);
    mgm.exports.push(export_id);
    graph.add_module_graph_module(mgm);

    let view = graph.module_graph_module(a).unwrap();
    assert_eq!(view.module_id, a);
    assert_eq!(view.exports, vec![export_id]);
}

#[test]
fn style_only_edges_are_stripped_after_ingestion() {
    let graph = ModuleGraph::new();
    let app = graph.add_module(module("/src/app.js"));
    let css = graph.add_module(module("/src/theme.css"));
    let util = graph.add_module(module("/src/util.js"));

    graph
        .add_dependency(Dependency::new(
            "./theme.css",
            DependencyKind::ImportStatement,
            app,
            css,
        ))
        .unwrap();
    graph
        .add_dependency(Dependency::new(
            "./util",
            DependencyKind::ImportStatement,
            app,
            util,
        ))
        .unwrap();

    graph.remove_no_import_style();

    let app_module = graph.module_by_id(app).unwrap();
    assert_eq!(app_module.dependencies.len(), 1);
    assert!(graph.module_by_id(css).unwrap().imported_by.is_empty());
    // The stylesheet module itself stays in the graph.
    assert_eq!(graph.module_count(), 3);
    assert_eq!(graph.dependency_count(), 1);
}

#[test]
fn to_data_is_a_flat_arena_walk() {
    let graph = ModuleGraph::new();
    let a = graph.add_module(module("/a.js"));
    let b = graph.add_module(module("/b.js"));
    graph
        .add_dependency(Dependency::new("./b", DependencyKind::RequireCall, a, b))
        .unwrap();

    let data = graph.to_data(DataMode::Full);
    assert_eq!(data.modules.len(), 2);
    assert_eq!(data.dependencies.len(), 1);
    assert_eq!(data.dependencies[0].origin_module_id, a);

    let json = graph.to_json(DataMode::Full).unwrap();
    assert!(json.contains("\"/a.js\""));
}

#[test]
fn lite_snapshot_drops_captured_sources() {
    let graph = ModuleGraph::new();
    let a = graph.add_module(module("/a.js"));
    graph.update_module(a, |m| {
        m.source.source = Some("const a = 1;".to_string());
        m.original_source = Some("const a = 1".to_string());
    });

    let full = graph.to_data(DataMode::Full);
    assert!(full.modules[0].source.source.is_some());

    let lite = graph.to_data(DataMode::Lite);
    assert!(lite.modules[0].source.source.is_none());
    assert!(lite.modules[0].original_source.is_none());
    // Structure survives.
    assert_eq!(lite.modules[0].path, "/a.js");
}
