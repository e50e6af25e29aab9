//! Diff result shapes handed to the comparison UI.

use serde::{Deserialize, Serialize};

use crate::asset_class::AssetClass;

/// How one compared item moved between baseline and current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffState {
    /// Present only in the current build.
    Added,
    /// Present only in the baseline build.
    Removed,
    Changed,
    Equal,
}

/// Size delta for one compared item or bucket.
///
/// `percent` is the relative growth in percent. A baseline of zero with a
/// nonzero current is reported as unbounded growth (`f64::INFINITY`), not
/// clamped; zero on both sides is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeDiff {
    pub baseline: u64,
    pub current: u64,
    pub state: DiffState,
    pub percent: f64,
}

impl SizeDiff {
    /// Delta for an item present on both sides.
    pub fn matched(baseline: u64, current: u64) -> Self {
        let state = if baseline == current {
            DiffState::Equal
        } else {
            DiffState::Changed
        };
        Self {
            baseline,
            current,
            state,
            percent: percent_of(baseline, current),
        }
    }

    /// Delta for a bucket where zero means absent: both zero is Equal, one
    /// side zero is Added or Removed.
    pub fn bucket(baseline: u64, current: u64) -> Self {
        let state = match (baseline, current) {
            (0, 0) => DiffState::Equal,
            (0, _) => DiffState::Added,
            (_, 0) => DiffState::Removed,
            (b, c) if b == c => DiffState::Equal,
            _ => DiffState::Changed,
        };
        Self {
            baseline,
            current,
            state,
            percent: percent_of(baseline, current),
        }
    }

    pub fn added(current: u64) -> Self {
        Self {
            baseline: 0,
            current,
            state: DiffState::Added,
            percent: percent_of(0, current),
        }
    }

    pub fn removed(baseline: u64) -> Self {
        Self {
            baseline,
            current: 0,
            state: DiffState::Removed,
            percent: percent_of(baseline, 0),
        }
    }
}

fn percent_of(baseline: u64, current: u64) -> f64 {
    if baseline == 0 {
        if current == 0 { 0.0 } else { f64::INFINITY }
    } else {
        (current as f64 - baseline as f64) / baseline as f64 * 100.0
    }
}

/// A diff section that degrades instead of failing when one side lacks the
/// underlying data (a bare stats snapshot carries no package view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum Section<T> {
    Available(T),
    Unavailable,
}

impl<T> Section<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn as_available(&self) -> Option<&T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}

/// Per-class size buckets: everything emitted, and the subset loaded on
/// initial page load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassDiff {
    pub class: AssetClass,
    pub total: SizeDiff,
    pub initial: SizeDiff,
}

/// One matched (by normalized name) or one-sided asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEntryDiff {
    /// Normalized, hash-stripped name the two sides were matched on.
    pub name: String,
    pub class: AssetClass,
    pub size: SizeDiff,
}

/// Unique-module-path set comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSetDiff {
    pub baseline_count: usize,
    pub current_count: usize,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub size: SizeDiff,
}

/// One (version, root) install of a package on one side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageVariant {
    pub version: String,
    pub root: String,
}

/// Presence comparison for one package name. Equal only when the exact
/// (version, root) sets match on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageEntryDiff {
    pub name: String,
    pub baseline: Vec<PackageVariant>,
    pub current: Vec<PackageVariant>,
    pub state: DiffState,
}

/// Duplicate-package counts, recomputed independently per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCountDiff {
    pub baseline: usize,
    pub current: usize,
}

/// The package sections of a diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDiff {
    pub entries: Vec<PackageEntryDiff>,
    pub duplicates: DuplicateCountDiff,
}

/// Full comparison of two sealed builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub classes: Vec<ClassDiff>,
    pub assets: Vec<AssetEntryDiff>,
    pub modules: ModuleSetDiff,
    pub packages: Section<PackageDiff>,
}

impl DiffResult {
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::Error::Serialization(format!("failed to serialize diff: {e}")))
    }
}
