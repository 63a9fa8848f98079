use super::types::{ConstructorMeta, FieldMeta, OperationMeta, TypeMeta, TypeRef};
use std::collections::HashMap;
use std::sync::Arc;

/// Introspection capability over a host program's types.
///
/// The closure algorithm only talks to this trait, so a host with a different
/// metadata source swaps the implementation and keeps the algorithm.
pub trait TypeMetadataProvider: Send + Sync {
    fn lookup(&self, name: &str) -> Option<Arc<TypeMeta>>;

    /// Supertype followed by implemented capabilities.
    fn super_types(&self, ty: &TypeMeta) -> Vec<TypeRef> {
        ty.super_type
            .iter()
            .chain(ty.capabilities.iter())
            .cloned()
            .collect()
    }

    fn declared_fields<'a>(&self, ty: &'a TypeMeta) -> &'a [FieldMeta] {
        &ty.fields
    }

    fn declared_operations<'a>(&self, ty: &'a TypeMeta) -> &'a [OperationMeta] {
        &ty.operations
    }

    fn declared_constructors<'a>(&self, ty: &'a TypeMeta) -> &'a [ConstructorMeta] {
        &ty.constructors
    }

    /// Whether `sub` is `sup` or reaches it through supertypes/capabilities.
    fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        let mut pending = vec![sub.to_string()];
        let mut seen = std::collections::HashSet::new();
        while let Some(name) = pending.pop() {
            if name == sup {
                return true;
            }
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(meta) = self.lookup(&name) {
                for parent in self.super_types(&meta) {
                    if let TypeRef::Named(parent) = parent {
                        pending.push(parent);
                    }
                }
            }
        }
        false
    }
}

/// In-memory type registry of a host program.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeMeta>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, meta: TypeMeta) -> &mut Self {
        self.types.insert(meta.name.clone(), Arc::new(meta));
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeMeta>> {
        self.types.values()
    }
}

impl TypeMetadataProvider for TypeRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<TypeMeta>> {
        self.types.get(name).cloned()
    }
}
