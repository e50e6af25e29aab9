//! Tree-shaking metadata attached to modules.
//!
//! Builds ingested from a live compiler graph carry export/side-effect data
//! per module; bare stats snapshots do not, and modules simply have no
//! [`ModuleGraphModule`] in that case.

use serde::{Deserialize, Serialize};

use crate::statement::Statement;

/// One exported symbol of a module.
///
/// `from` links a re-export to the [`ExportInfo`] it forwards, forming a
/// chain across modules. Chains are resolved with a visited set; malformed
/// input with a cycle yields no terminal export instead of looping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub id: u32,
    pub name: String,
    /// Statement that declares the export, when located.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<Statement>,
    /// Id of the ExportInfo this one re-exports, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u32>,
}

impl ExportInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            statement: None,
            from: None,
        }
    }

    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statement = Some(statement);
        self
    }

    pub fn with_from(mut self, from: u32) -> Self {
        self.from = Some(from);
        self
    }
}

/// A local binding tied to an export, with its usage status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub id: u32,
    pub name: String,
    pub module_id: u32,
    pub used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<Statement>,
    /// Export this binding belongs to, when it is exported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_id: Option<u32>,
}

impl Variable {
    pub fn new(name: impl Into<String>, module_id: u32, used: bool) -> Self {
        Self {
            id: 0,
            name: name.into(),
            module_id,
            used,
            statement: None,
            export_id: None,
        }
    }
}

/// An import specifier consumed for side effects only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEffect {
    pub id: u32,
    pub name: String,
    pub module_id: u32,
    /// ExportInfo in another module this side effect pulls from, when the
    /// compiler resolved one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<Statement>,
}

impl SideEffect {
    pub fn new(name: impl Into<String>, module_id: u32) -> Self {
        Self {
            id: 0,
            name: name.into(),
            module_id,
            export_id: None,
            statement: None,
        }
    }
}

/// Tree-shaking view of one module: its exports, exported bindings, and
/// side-effect imports. Attached 1:1 to a module when export data exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGraphModule {
    pub id: u32,
    pub module_id: u32,
    /// Ids of this module's ExportInfo entries (stored centrally so
    /// cross-module re-export chains can be walked by id).
    #[serde(default)]
    pub exports: Vec<u32>,
    #[serde(default)]
    pub side_effects: Vec<SideEffect>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    /// True if the module is only reachable through dynamic import.
    #[serde(default)]
    pub dynamic: bool,
}

impl ModuleGraphModule {
    pub fn new(module_id: u32) -> Self {
        Self {
            module_id,
            ..Self::default()
        }
    }
}
