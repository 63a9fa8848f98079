//! Module closure computation.
//!
//! Starting from a root type, every type reachable through supertypes,
//! capabilities, instance fields, and the parameter/return/failure types of
//! instance operations and constructors contributes one module id. Builtin
//! value types are never expanded, arrays expand to their element type, and
//! container types stop the walk because their element type is erased.

use crate::host::{module_id_for, OperationMeta, TypeMeta, TypeMetadataProvider, TypeRef};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// The unique module ids needed to load and run one operation, in discovery
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleClosure {
    modules: Vec<String>,
    index: HashSet<String>,
    external: BTreeSet<String>,
}

impl ModuleClosure {
    pub fn contains(&self, module_id: &str) -> bool {
        self.index.contains(module_id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    /// Modules referenced by the program but unknown to its type registry.
    pub fn external(&self) -> impl Iterator<Item = &str> {
        self.external.iter().map(String::as_str)
    }

    fn insert(&mut self, module_id: String) -> bool {
        if self.index.insert(module_id.clone()) {
            self.modules.push(module_id);
            true
        } else {
            false
        }
    }
}

/// Depth-first closure walk. The visited set lives only as long as one
/// resolution.
pub(crate) struct ClosureBuilder<'a> {
    provider: &'a dyn TypeMetadataProvider,
    visited: HashSet<String>,
    closure: ModuleClosure,
}

impl<'a> ClosureBuilder<'a> {
    pub(crate) fn new(provider: &'a dyn TypeMetadataProvider) -> Self {
        Self {
            provider,
            visited: HashSet::new(),
            closure: ModuleClosure::default(),
        }
    }

    pub(crate) fn visit_type_meta(&mut self, meta: &TypeMeta) {
        if !self.visited.insert(meta.name.clone()) {
            return;
        }
        self.closure.insert(meta.module_id());

        for parent in self.provider.super_types(meta) {
            self.visit(&parent);
        }

        for field in self.provider.declared_fields(meta) {
            if !field.is_static {
                self.visit(&field.ty);
            }
        }

        for ctor in self.provider.declared_constructors(meta) {
            for ty in ctor.params.iter().chain(ctor.failures.iter()) {
                self.visit(ty);
            }
        }

        for op in self.provider.declared_operations(meta) {
            if !op.is_static {
                self.visit_operation(op);
            }
        }
    }

    pub(crate) fn visit_operation(&mut self, op: &OperationMeta) {
        for ty in op.params.iter() {
            self.visit(ty);
        }
        self.visit(&op.returns);
        for ty in op.failures.iter() {
            self.visit(ty);
        }
    }

    pub(crate) fn visit(&mut self, ty: &TypeRef) {
        match ty {
            TypeRef::Void
            | TypeRef::Primitive(_)
            | TypeRef::Boxed(_)
            | TypeRef::Text
            | TypeRef::Top
            | TypeRef::Container(_) => {}
            TypeRef::Array(elem) => self.visit(elem),
            TypeRef::Named(name) => {
                if self.visited.contains(name) {
                    return;
                }
                match self.provider.lookup(name) {
                    Some(meta) => self.visit_type_meta(&meta),
                    None => {
                        debug!(type_name = %name, "Referenced type not in registry; not expanded");
                        self.visited.insert(name.clone());
                        let module_id = module_id_for(name);
                        self.closure.external.insert(module_id.clone());
                        self.closure.insert(module_id);
                    }
                }
            }
        }
    }

    pub(crate) fn finish(self) -> ModuleClosure {
        self.closure
    }
}
