//! Source-location records attached to dependencies and exports.

use serde::{Deserialize, Serialize};

/// A position in a source file. Column is optional because some bundler
/// outputs only carry line precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl SourcePosition {
    pub fn new(line: u32, column: Option<u32>) -> Self {
        Self { line, column }
    }
}

/// A half-open range in a source file. `end` may be absent for single-point
/// locations (e.g. a require call reported by line only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: SourcePosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<SourcePosition>,
}

impl SourceRange {
    pub fn new(start: SourcePosition, end: Option<SourcePosition>) -> Self {
        Self { start, end }
    }

    pub fn line(line: u32) -> Self {
        Self {
            start: SourcePosition::new(line, None),
            end: None,
        }
    }
}

/// One call/import site inside a module. A dependency referenced from several
/// lines carries one statement per site, in source order.
///
/// Both the pre-transform and post-transform positions are kept so consumers
/// can point at either the file the author wrote or the code the bundler saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Module this statement lives in.
    pub module_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_range: Option<SourceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformed_range: Option<SourceRange>,
}

impl Statement {
    pub fn new(
        module_id: u32,
        source_range: Option<SourceRange>,
        transformed_range: Option<SourceRange>,
    ) -> Self {
        Self {
            module_id,
            source_range,
            transformed_range,
        }
    }
}
