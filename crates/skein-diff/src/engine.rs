//! The diff pass itself.
//!
//! Pure and I/O-free over two sealed snapshots; safe to run concurrently on
//! any number of already-built pairs. Neither input is ever mutated.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use tracing::debug;

use skein_ingest::BuildSnapshot;

use crate::asset_class::{AssetClass, normalize_asset_name};
use crate::result::{
    AssetEntryDiff, ClassDiff, DiffResult, DiffState, DuplicateCountDiff, ModuleSetDiff,
    PackageDiff, PackageEntryDiff, PackageVariant, Section, SizeDiff,
};

/// Compare two sealed builds.
///
/// Assets are matched by normalized (hash-stripped) name within their class;
/// modules by deduplicated path set; packages by exact (name, version, root)
/// presence. The package sections degrade to [`Section::Unavailable`] when
/// either side carries no package view; every other section still diffs.
pub fn diff(baseline: &BuildSnapshot, current: &BuildSnapshot) -> DiffResult {
    let baseline_assets = collect_assets(baseline);
    let current_assets = collect_assets(current);

    DiffResult {
        classes: diff_classes(&baseline_assets, &current_assets),
        assets: diff_asset_entries(&baseline_assets, &current_assets),
        modules: diff_modules(baseline, current),
        packages: diff_packages(baseline, current),
    }
}

/// One side's assets, pre-bucketed. Several emitted files can normalize to
/// the same name (split chunks re-hashed per build); their sizes sum.
struct SideAssets {
    by_name: BTreeMap<(AssetClass, String), u64>,
    class_total: FxHashMap<AssetClass, u64>,
    class_initial: FxHashMap<AssetClass, u64>,
}

fn collect_assets(snapshot: &BuildSnapshot) -> SideAssets {
    let mut side = SideAssets {
        by_name: BTreeMap::new(),
        class_total: FxHashMap::default(),
        class_initial: FxHashMap::default(),
    };
    for asset in snapshot.chunk_graph.assets() {
        let class = AssetClass::of(&asset.path);
        let name = normalize_asset_name(&asset.path);
        let initial = asset.chunks.iter().any(|chunk_id| {
            snapshot
                .chunk_graph
                .chunk_by_id(chunk_id)
                .map(|chunk| chunk.initial)
                .unwrap_or(false)
        });

        *side.by_name.entry((class, name)).or_insert(0) += asset.size;
        *side.class_total.entry(class).or_insert(0) += asset.size;
        if initial {
            *side.class_initial.entry(class).or_insert(0) += asset.size;
        }
    }
    side
}

fn diff_classes(baseline: &SideAssets, current: &SideAssets) -> Vec<ClassDiff> {
    AssetClass::ALL
        .iter()
        .map(|&class| {
            let total_b = baseline.class_total.get(&class).copied().unwrap_or(0);
            let total_c = current.class_total.get(&class).copied().unwrap_or(0);
            let initial_b = baseline.class_initial.get(&class).copied().unwrap_or(0);
            let initial_c = current.class_initial.get(&class).copied().unwrap_or(0);
            ClassDiff {
                class,
                total: SizeDiff::bucket(total_b, total_c),
                initial: SizeDiff::bucket(initial_b, initial_c),
            }
        })
        .collect()
}

fn diff_asset_entries(baseline: &SideAssets, current: &SideAssets) -> Vec<AssetEntryDiff> {
    let keys: BTreeSet<&(AssetClass, String)> = baseline
        .by_name
        .keys()
        .chain(current.by_name.keys())
        .collect();

    keys.into_iter()
        .map(|key| {
            let (class, name) = key;
            let size = match (baseline.by_name.get(key), current.by_name.get(key)) {
                (Some(&b), Some(&c)) => SizeDiff::matched(b, c),
                (Some(&b), None) => SizeDiff::removed(b),
                (None, Some(&c)) => SizeDiff::added(c),
                (None, None) => unreachable!("key comes from one of the two maps"),
            };
            AssetEntryDiff {
                name: name.clone(),
                class: *class,
                size,
            }
        })
        .collect()
}

fn diff_modules(baseline: &BuildSnapshot, current: &BuildSnapshot) -> ModuleSetDiff {
    let baseline_paths = module_paths(baseline);
    let current_paths = module_paths(current);

    let added = current_paths
        .difference(&baseline_paths)
        .cloned()
        .collect();
    let removed = baseline_paths
        .difference(&current_paths)
        .cloned()
        .collect();

    ModuleSetDiff {
        baseline_count: baseline_paths.len(),
        current_count: current_paths.len(),
        added,
        removed,
        size: SizeDiff::matched(total_module_size(baseline), total_module_size(current)),
    }
}

/// Deduplicated module path set; a concatenation can surface the same path
/// through both the fused module and a standalone copy.
fn module_paths(snapshot: &BuildSnapshot) -> BTreeSet<String> {
    snapshot
        .module_graph
        .modules()
        .iter()
        .map(|module| module.path.clone())
        .collect()
}

fn total_module_size(snapshot: &BuildSnapshot) -> u64 {
    let ids: Vec<u32> = snapshot
        .module_graph
        .modules()
        .iter()
        .map(|module| module.id)
        .collect();
    snapshot.module_graph.effective_size_of(&ids)
}

fn diff_packages(baseline: &BuildSnapshot, current: &BuildSnapshot) -> Section<PackageDiff> {
    let (Some(baseline_packages), Some(current_packages)) =
        (&baseline.package_graph, &current.package_graph)
    else {
        debug!(
            baseline = baseline.package_graph.is_some(),
            current = current.package_graph.is_some(),
            "package section unavailable on at least one side"
        );
        return Section::Unavailable;
    };

    let baseline_variants = package_variants(baseline_packages);
    let current_variants = package_variants(current_packages);
    let names: BTreeSet<&String> = baseline_variants
        .keys()
        .chain(current_variants.keys())
        .collect();

    let entries = names
        .into_iter()
        .map(|name| {
            let b = baseline_variants.get(name);
            let c = current_variants.get(name);
            let state = match (b, c) {
                (None, Some(_)) => DiffState::Added,
                (Some(_), None) => DiffState::Removed,
                (Some(b), Some(c)) if b == c => DiffState::Equal,
                _ => DiffState::Changed,
            };
            PackageEntryDiff {
                name: name.clone(),
                baseline: b.map(|set| set.iter().cloned().collect()).unwrap_or_default(),
                current: c.map(|set| set.iter().cloned().collect()).unwrap_or_default(),
                state,
            }
        })
        .collect();

    Section::Available(PackageDiff {
        entries,
        duplicates: DuplicateCountDiff {
            baseline: baseline_packages.duplicate_package_names().len(),
            current: current_packages.duplicate_package_names().len(),
        },
    })
}

fn package_variants(
    packages: &skein_graph::PackageGraph,
) -> BTreeMap<String, BTreeSet<PackageVariant>> {
    let mut variants: BTreeMap<String, BTreeSet<PackageVariant>> = BTreeMap::new();
    for package in packages.packages() {
        variants
            .entry(package.name.clone())
            .or_default()
            .insert(PackageVariant {
                version: package.version.clone(),
                root: package.root.clone(),
            });
    }
    variants
}
