//! Operation lookup and guarded invocation.

use crate::host::{
    CallResult, Component, Failure, OperationMeta, TypeMeta, TypeMetadataProvider, TypeRef,
    Value,
};
use crate::recorder::panic_message;
use crate::resolver::{operations_named, OperationDescriptor};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Pick the operation to invoke on `root`.
///
/// An exact signature match from resolution wins. Otherwise the declared
/// parameter types are compared to each candidate, and failing that the
/// first candidate (nearest declaration first) whose arity matches and whose
/// parameters accept every argument is chosen.
pub fn find_operation(
    provider: &dyn TypeMetadataProvider,
    root: &TypeMeta,
    descriptor: &OperationDescriptor,
    exact: Option<&OperationMeta>,
    args: &[Value],
) -> Option<OperationMeta> {
    if let Some(op) = exact {
        return Some(op.clone());
    }

    let candidates = operations_named(provider, root, descriptor.operation_name());
    if descriptor.has_declared_types() {
        let wanted = descriptor.parameter_types();
        if let Some(op) = candidates.iter().find(|op| op.params == wanted) {
            return Some(op.clone());
        }
    }

    candidates.into_iter().find(|op| {
        op.params.len() == args.len()
            && op
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| is_assignable(param, arg, provider))
    })
}

/// Whether `value` can be passed where `param` is declared. Primitive kinds
/// and their boxed forms are interchangeable; null fits any non-primitive.
pub fn is_assignable(param: &TypeRef, value: &Value, provider: &dyn TypeMetadataProvider) -> bool {
    match (param, value) {
        (TypeRef::Primitive(_), Value::Null) => false,
        (_, Value::Null) => true,
        (TypeRef::Top, _) => true,
        (TypeRef::Primitive(kind) | TypeRef::Boxed(kind), v) => v.primitive_kind() == Some(*kind),
        (TypeRef::Text, Value::Text(_)) => true,
        (TypeRef::Container(name), Value::Map(_)) => name == "Map",
        (TypeRef::Container(name), Value::List(_)) => name != "Map" && name != "Optional",
        (TypeRef::Array(elem), Value::List(items)) => {
            items.iter().all(|item| is_assignable(elem, item, provider))
        }
        (
            TypeRef::Named(expected),
            Value::Object { type_name, .. } | Value::Enum { type_name, .. },
        ) => provider.is_subtype(type_name, expected),
        _ => false,
    }
}

/// Invoke `operation` on `target`, converting a panic into a failure.
#[tracing::instrument(skip_all, fields(operation = %operation.signature()))]
pub fn invoke_operation(target: &dyn Component, operation: &OperationMeta, args: Vec<Value>) -> CallResult {
    info!("Invoking {}#{}", target.type_name(), operation.name);
    debug!(args = args.len(), "Argument count");

    match panic::catch_unwind(AssertUnwindSafe(|| target.invoke(operation, args))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(failure)) => {
            warn!(failure = %failure, "Operation failed");
            Err(failure)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(panic = %message, "Operation panicked");
            Err(Failure::new("panic", message))
        }
    }
}
