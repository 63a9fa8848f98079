use super::{arg, long_arg, text_arg};
use crate::host::{
    CallResult, Component, ComponentCatalog, Failure, OperationMeta, PrimitiveKind, TypeMeta,
    TypeRef, TypeRegistry, Value,
};
use std::sync::Arc;

pub const SAMPLE: &str = "demo.util.Sample";
pub const PARITY: &str = "demo.util.Parity";

pub(super) fn register_types(registry: &mut TypeRegistry) {
    let long = TypeRef::Primitive(PrimitiveKind::Long);
    registry
        .register(
            TypeMeta::class(SAMPLE)
                .operation(OperationMeta::new("echo").param(long.clone()).returns(long.clone()))
                .operation(OperationMeta::new("greet").param(TypeRef::Text).returns(TypeRef::Text))
                .operation(
                    OperationMeta::new("parity")
                        .param(TypeRef::named(PARITY))
                        .returns(TypeRef::Text),
                )
                .operation(
                    OperationMeta::new("classify")
                        .param(long)
                        .returns(TypeRef::named(PARITY)),
                )
                .operation(
                    OperationMeta::new("describe")
                        .param(TypeRef::Top)
                        .returns(TypeRef::Text),
                )
                .operation(
                    OperationMeta::new("fail")
                        .returns(TypeRef::Void)
                        .fails_with(TypeRef::named("java.lang.IllegalStateException")),
                )
                .operation(OperationMeta::new("crash").returns(TypeRef::Void)),
        )
        .register(TypeMeta::enumeration(PARITY, &["EVEN", "ODD"]));
}

pub(super) fn register_components(catalog: &mut ComponentCatalog) {
    catalog.no_arg(SAMPLE, || Arc::new(Sample));
}

/// Stateless utility operations.
struct Sample;

impl Component for Sample {
    fn type_name(&self) -> &str {
        SAMPLE
    }

    fn invoke(&self, operation: &OperationMeta, args: Vec<Value>) -> CallResult {
        match operation.name.as_str() {
            "echo" => Ok(Value::Long(long_arg(&args, 0)?)),
            "greet" => Ok(Value::text(format!("Hello, {}!", text_arg(&args, 0)?))),
            "parity" => match arg(&args, 0)? {
                Value::Enum { variant, .. } => Ok(Value::text(variant.to_lowercase())),
                other => Err(Failure::new(
                    "IllegalArgumentException",
                    format!("expected {}, got {}", PARITY, other.kind_name()),
                )),
            },
            "classify" => {
                let n = long_arg(&args, 0)?;
                let variant = if n % 2 == 0 { "EVEN" } else { "ODD" };
                Ok(Value::Enum {
                    type_name: PARITY.to_string(),
                    variant: variant.to_string(),
                })
            }
            "describe" => {
                let value = arg(&args, 0)?;
                Ok(Value::text(format!("{} {}", value.kind_name(), value)))
            }
            "fail" => Err(Failure::new("IllegalStateException", "requested failure")),
            "crash" => panic!("sample crashed"),
            _ => Err(Failure::no_such_operation(SAMPLE, operation)),
        }
    }
}
