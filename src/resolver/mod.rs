//! Dependency closure resolution.
//!
//! [`DependencyResolver::resolve`] turns a target specifier into an
//! [`OperationDescriptor`] and the [`ModuleClosure`] needed to run it.

pub mod closure;
pub mod specifier;

pub use closure::ModuleClosure;
pub use specifier::OperationDescriptor;

use crate::host::{OperationMeta, TypeMeta, TypeMetadataProvider, TypeRef};
use crate::{DebuggerError, Result};
use closure::ClosureBuilder;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

/// Output of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub descriptor: OperationDescriptor,
    pub closure: ModuleClosure,
    /// The operation matched type-for-type, when the specifier declared
    /// parameter types and such an operation exists.
    pub exact_operation: Option<OperationMeta>,
}

pub struct DependencyResolver<'a> {
    provider: &'a dyn TypeMetadataProvider,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(provider: &'a dyn TypeMetadataProvider) -> Self {
        Self { provider }
    }

    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, specifier: &str) -> Result<Resolution> {
        let descriptor = OperationDescriptor::parse(specifier)?;
        let root = self
            .provider
            .lookup(descriptor.type_name())
            .ok_or_else(|| DebuggerError::TypeNotFound(descriptor.type_name().to_string()))?;

        let candidates = operations_named(self.provider, &root, descriptor.operation_name());
        if candidates.is_empty() {
            return Err(DebuggerError::OperationNotFound {
                type_name: root.name.clone(),
                operation: descriptor.operation_name().to_string(),
            });
        }

        let mut builder = ClosureBuilder::new(self.provider);
        builder.visit_type_meta(&root);

        let exact_operation = if descriptor.has_declared_types() {
            let wanted = descriptor.parameter_types();
            let found = candidates.into_iter().find(|op| op.params == wanted);
            match &found {
                Some(op) => builder.visit_operation(op),
                None => debug!(
                    descriptor = %descriptor,
                    "No exact signature match; invocation will match by arity"
                ),
            }
            found
        } else {
            None
        };

        let closure = builder.finish();
        info!(
            descriptor = %descriptor,
            modules = closure.len(),
            external = closure.external().count(),
            "Resolved module closure"
        );

        Ok(Resolution {
            descriptor,
            closure,
            exact_operation,
        })
    }
}

/// Operations called `name` declared on `root` or any of its supertypes and
/// capabilities, nearest declarations first.
pub fn operations_named(
    provider: &dyn TypeMetadataProvider,
    root: &TypeMeta,
    name: &str,
) -> Vec<OperationMeta> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let mut queue: VecDeque<Arc<TypeMeta>> = VecDeque::new();
    seen.insert(root.name.clone());
    queue.push_back(Arc::new(root.clone()));

    while let Some(meta) = queue.pop_front() {
        found.extend(
            provider
                .declared_operations(&meta)
                .iter()
                .filter(|op| op.name == name)
                .cloned(),
        );
        for parent in provider.super_types(&meta) {
            if let TypeRef::Named(parent) = parent {
                if seen.insert(parent.clone()) {
                    if let Some(parent_meta) = provider.lookup(&parent) {
                        queue.push_back(parent_meta);
                    }
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{PrimitiveKind, TypeRegistry};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                TypeMeta::class("s.Sample")
                    .operation(
                        OperationMeta::new("echo")
                            .param(TypeRef::Primitive(PrimitiveKind::Long))
                            .returns(TypeRef::Primitive(PrimitiveKind::Long)),
                    )
                    .operation(
                        OperationMeta::new("wrap")
                            .static_op()
                            .param(TypeRef::named("s.Input"))
                            .returns(TypeRef::named("s.Output")),
                    ),
            )
            .register(TypeMeta::class("s.Input"))
            .register(TypeMeta::class("s.Output"));
        registry
    }

    #[test]
    fn resolves_descriptor_and_closure() {
        let registry = registry();
        let resolution = DependencyResolver::new(&registry)
            .resolve("s.Sample#echo(long)")
            .unwrap();
        assert_eq!(resolution.descriptor.operation_name(), "echo");
        assert!(resolution.exact_operation.is_some());
        assert_eq!(resolution.closure.iter().collect::<Vec<_>>(), ["s/Sample.mod"]);
    }

    #[test]
    fn exact_static_operation_is_folded_into_the_closure() {
        let registry = registry();
        let resolution = DependencyResolver::new(&registry)
            .resolve("s.Sample#wrap(s.Input)")
            .unwrap();
        assert!(resolution.closure.contains("s/Input.mod"));
        assert!(resolution.closure.contains("s/Output.mod"));
    }

    #[test]
    fn inexact_signature_still_resolves() {
        let registry = registry();
        let resolution = DependencyResolver::new(&registry)
            .resolve("s.Sample#echo(java.lang.String)")
            .unwrap();
        assert!(resolution.exact_operation.is_none());
    }

    #[test]
    fn unknown_type_and_operation_fail() {
        let registry = registry();
        let resolver = DependencyResolver::new(&registry);
        assert!(matches!(
            resolver.resolve("s.Missing#echo"),
            Err(DebuggerError::TypeNotFound(name)) if name == "s.Missing"
        ));
        assert!(matches!(
            resolver.resolve("s.Sample#nope"),
            Err(DebuggerError::OperationNotFound { .. })
        ));
        assert!(matches!(
            resolver.resolve("#echo"),
            Err(DebuggerError::ParseError(_))
        ));
    }
}
