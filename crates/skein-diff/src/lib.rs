//! # skein-diff
//!
//! Compares two sealed build snapshots and reports categorized deltas:
//! per-asset-class size buckets (total and initial), per-asset deltas
//! matched under hashed-filename noise, module path-set changes, and
//! package presence with duplicate counts per side.
//!
//! The engine is a pure function over its inputs. It performs no I/O, never
//! mutates either snapshot, and degrades section-by-section instead of
//! failing when one side lacks data (a bare stats snapshot has no package
//! view, so the package sections come back [`Section::Unavailable`]).

pub mod asset_class;
pub mod engine;
pub mod result;

pub use asset_class::{AssetClass, normalize_asset_name};
pub use engine::diff;
pub use result::{
    AssetEntryDiff, ClassDiff, DiffResult, DiffState, DuplicateCountDiff, ModuleSetDiff,
    PackageDiff, PackageEntryDiff, PackageVariant, Section, SizeDiff,
};

/// Error types for diff serialization.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Diff result serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for diff operations.
pub type Result<T> = std::result::Result<T, Error>;
