//! Mutation methods for [`ModuleGraph`].

use std::sync::Arc;

use tracing::debug;

use super::graph::{ModuleGraph, ModuleGraphInner};
use crate::dependency::Dependency;
use crate::ids::EntityKind;
use crate::module::Module;
use crate::tree_shaking::{ExportInfo, ModuleGraphModule};
use crate::{Error, Result};

impl ModuleGraph {
    /// Add a module, assigning its id. Idempotent against the module's
    /// native id and file path: re-adding a known module returns the
    /// existing id and changes nothing.
    pub fn add_module(&self, mut module: Module) -> u32 {
        let mut inner = self.inner.write();

        if let Some(native_id) = module.native_id {
            if let Some(&existing) = inner.by_native.get(&native_id) {
                return existing;
            }
        }
        if let Some(&existing) = inner.by_file.get(&module.path) {
            // The first insertion may have lacked a native id; learn it here
            // so detail patches addressed by native id still land.
            if let Some(native_id) = module.native_id {
                inner.by_native.insert(native_id, existing);
            }
            return existing;
        }

        let id = inner.ids.next(EntityKind::Module);
        module.id = id;
        if let Some(native_id) = module.native_id {
            inner.by_native.insert(native_id, id);
        }
        inner.by_file.insert(module.path.clone(), id);
        inner.modules.insert(id, Arc::new(module));
        id
    }

    /// Add a batch of modules in order, returning their ids.
    pub fn add_modules<I>(&self, modules: I) -> Vec<u32>
    where
        I: IntoIterator<Item = Module>,
    {
        modules.into_iter().map(|m| self.add_module(m)).collect()
    }

    /// Rewrite a module's path (e.g. to strip a machine-specific prefix).
    /// Fails if another module already owns the new path; path uniqueness is
    /// a graph invariant.
    pub fn set_path(&self, module_id: u32, new_path: impl Into<String>) -> Result<()> {
        let new_path = new_path.into();
        let mut inner = self.inner.write();

        if let Some(&owner) = inner.by_file.get(&new_path) {
            if owner != module_id {
                return Err(Error::DuplicatePath(new_path));
            }
            return Ok(());
        }

        let Some(module_arc) = inner.modules.get(&module_id) else {
            return Ok(());
        };
        let old_path = module_arc.path.clone();
        let mut module = (**module_arc).clone();
        module.path = new_path.clone();
        inner.modules.insert(module_id, Arc::new(module));
        inner.by_file.remove(&old_path);
        inner.by_file.insert(new_path, module_id);
        Ok(())
    }

    /// Add a dependency edge, linking forward and reverse adjacency on the
    /// involved modules. At most one dependency exists per (origin, request);
    /// re-adding updates the stored edge in place. Returns `None` when either
    /// endpoint is not in the graph (partial ingestion: skip, do not crash).
    pub fn add_dependency(&self, mut dep: Dependency) -> Option<u32> {
        let mut inner = self.inner.write();

        if !inner.modules.contains_key(&dep.origin_module_id)
            || !inner.modules.contains_key(&dep.target_module_id)
        {
            debug!(
                origin = dep.origin_module_id,
                target = dep.target_module_id,
                request = %dep.request,
                "skipping dependency with unknown endpoint"
            );
            return None;
        }

        let key = (dep.origin_module_id, dep.request.clone());
        if let Some(&existing_id) = inner.dependency_index.get(&key) {
            let existing = inner
                .dependencies
                .get(&existing_id)
                .expect("indexed dependency must exist");
            let old_target = existing.target_module_id;
            let mut updated = (**existing).clone();
            updated.kind = dep.kind;
            updated.meta = dep.meta.take();
            updated.target_module_id = dep.target_module_id;
            for statement in dep.statements.drain(..) {
                if !updated.statements.contains(&statement) {
                    updated.statements.push(statement);
                }
            }
            inner.dependencies.insert(existing_id, Arc::new(updated));
            if old_target != dep.target_module_id {
                Self::unlink_imported_by(&mut inner, old_target, existing_id);
                Self::link_imported_by(&mut inner, dep.target_module_id, existing_id);
            }
            return Some(existing_id);
        }

        let id = inner.ids.next(EntityKind::Dependency);
        dep.id = id;
        let origin = dep.origin_module_id;
        let target = dep.target_module_id;
        inner.dependency_index.insert(key, id);
        inner.dependencies.insert(id, Arc::new(dep));

        Self::update_module_in(&mut inner, origin, |m| {
            if !m.dependencies.contains(&id) {
                m.dependencies.push(id);
            }
        });
        Self::link_imported_by(&mut inner, target, id);
        Some(id)
    }

    /// Attach a tree-shaking view to its module. Export entries are
    /// registered centrally first via [`ModuleGraph::add_export_info`] so the
    /// view only carries their ids. Replaces any previous view for the module.
    pub fn add_module_graph_module(&self, mut mgm: ModuleGraphModule) -> u32 {
        let mut inner = self.inner.write();
        let id = inner.ids.next(EntityKind::ModuleGraphModule);
        mgm.id = id;
        for variable in &mut mgm.variables {
            variable.id = inner.ids.next(EntityKind::Variable);
        }
        for side_effect in &mut mgm.side_effects {
            side_effect.id = inner.ids.next(EntityKind::SideEffect);
        }
        inner.module_graph_modules.insert(mgm.module_id, mgm);
        id
    }

    /// Register an exported-symbol record and return its id.
    pub fn add_export_info(&self, mut info: ExportInfo) -> u32 {
        let mut inner = self.inner.write();
        let id = inner.ids.next(EntityKind::ExportInfo);
        info.id = id;
        inner.exports.insert(id, info);
        id
    }

    /// Record the id the bundler runtime assigned to a module. The module is
    /// addressed by its bundler-native id; an unregistered native id is
    /// dropped, not queued.
    pub fn set_render_id(&self, native_id: u64, render_id: impl Into<String>) -> bool {
        let render_id = render_id.into();
        self.update_module_by_native(native_id, |m| m.render_id = Some(render_id.clone()))
    }

    /// Attach the pre-transform source recovered for a module.
    pub fn set_original_source(&self, native_id: u64, source: impl Into<String>) -> bool {
        let source = source.into();
        self.update_module_by_native(native_id, |m| m.original_source = Some(source.clone()))
    }

    /// Overlay the parsed (emitted-bundle) size of a module.
    pub fn set_parsed_size(&self, module_id: u32, parsed_size: u64) -> bool {
        self.update_module(module_id, |m| m.size.parsed_size = parsed_size)
    }

    /// Record chunk membership on the module side.
    pub fn add_module_to_chunk(&self, module_id: u32, chunk_id: &str) -> bool {
        self.update_module(module_id, |m| {
            if !m.chunks.iter().any(|c| c == chunk_id) {
                m.chunks.push(chunk_id.to_string());
            }
        })
    }

    /// Link a concatenation module to its constituents, back-linking each
    /// constituent to the parent.
    pub fn set_concatenation_children(&self, parent_id: u32, children: &[u32]) {
        let mut inner = self.inner.write();
        Self::update_module_in(&mut inner, parent_id, |m| {
            for &child in children {
                if !m.concatenation_children.contains(&child) {
                    m.concatenation_children.push(child);
                }
            }
        });
        for &child in children {
            Self::update_module_in(&mut inner, child, |m| {
                if !m.concatenation_parents.contains(&parent_id) {
                    m.concatenation_parents.push(parent_id);
                }
            });
        }
    }

    /// Apply a closure to one module. Returns false if the module is absent.
    pub fn update_module<F>(&self, module_id: u32, f: F) -> bool
    where
        F: FnOnce(&mut Module),
    {
        let mut inner = self.inner.write();
        Self::update_module_in(&mut inner, module_id, f)
    }

    fn update_module_by_native<F>(&self, native_id: u64, f: F) -> bool
    where
        F: FnOnce(&mut Module),
    {
        let mut inner = self.inner.write();
        let Some(&module_id) = inner.by_native.get(&native_id) else {
            debug!(native_id, "dropping detail for unregistered module");
            return false;
        };
        Self::update_module_in(&mut inner, module_id, f)
    }

    pub(super) fn update_module_in<F>(inner: &mut ModuleGraphInner, module_id: u32, f: F) -> bool
    where
        F: FnOnce(&mut Module),
    {
        let Some(module_arc) = inner.modules.get(&module_id) else {
            return false;
        };
        let mut module = (**module_arc).clone();
        f(&mut module);
        inner.modules.insert(module_id, Arc::new(module));
        true
    }

    fn link_imported_by(inner: &mut ModuleGraphInner, target: u32, dep_id: u32) {
        Self::update_module_in(inner, target, |m| {
            if !m.imported_by.contains(&dep_id) {
                m.imported_by.push(dep_id);
            }
        });
    }

    fn unlink_imported_by(inner: &mut ModuleGraphInner, target: u32, dep_id: u32) {
        Self::update_module_in(inner, target, |m| {
            m.imported_by.retain(|&d| d != dep_id);
        });
    }
}
