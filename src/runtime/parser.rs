//! Argument coercion for target operations.
//!
//! The control protocol carries a single untyped input value. This module
//! turns it into the argument list handed to the operation:
//! - With no declared parameter types the input passes through unchanged
//!   (no arguments when it is absent).
//! - With declared types the input is coerced to the first declared type:
//!   identity when already assignable, numeric re-widening/narrowing,
//!   stringification for the text type, and case-sensitive variant lookup
//!   for enumerations. Anything else is left for invocation to reject.

use crate::host::{PrimitiveKind, TypeMetadataProvider, TypeRef, Value};
use crate::resolver::OperationDescriptor;
use crate::runtime::invoker::is_assignable;
use crate::{DebuggerError, Result};
use tracing::debug;

pub fn convert_args(
    descriptor: &OperationDescriptor,
    input: Option<Value>,
    provider: &dyn TypeMetadataProvider,
) -> Result<Vec<Value>> {
    if !descriptor.has_declared_types() {
        return Ok(input.into_iter().collect());
    }

    // Only the first declared parameter receives the input.
    let target = TypeRef::parse(&descriptor.parameter_type_names()[0]);
    let value = input.unwrap_or(Value::Null);
    Ok(vec![coerce_value(&target, value, provider)?])
}

pub fn coerce_value(
    target: &TypeRef,
    value: Value,
    provider: &dyn TypeMetadataProvider,
) -> Result<Value> {
    if value.is_null() || is_assignable(target, &value, provider) {
        return Ok(value);
    }

    if let (Some(kind), Some(_)) = (target.numeric_kind(), value.numeric_kind()) {
        return Ok(coerce_numeric(&value, kind));
    }

    if *target == TypeRef::Text {
        return Ok(Value::Text(value.to_string()));
    }

    if let (TypeRef::Named(type_name), Value::Text(name)) = (target, &value) {
        if let Some(variants) = provider
            .lookup(type_name)
            .and_then(|meta| meta.enum_variants().map(<[String]>::to_vec))
        {
            return if variants.iter().any(|v| v == name) {
                Ok(Value::Enum {
                    type_name: type_name.clone(),
                    variant: name.clone(),
                })
            } else {
                Err(DebuggerError::InvalidArguments(format!(
                    "No enum constant {}.{}",
                    type_name, name
                )))
            };
        }
    }

    debug!(target = %target, value = %value.kind_name(), "Passing argument through uncoerced");
    Ok(value)
}

/// Convert a numeric value to `kind` with two's-complement narrowing and
/// saturating float-to-integer conversion.
pub fn coerce_numeric(value: &Value, kind: PrimitiveKind) -> Value {
    let is_float = matches!(value, Value::Float(_) | Value::Double(_));
    let int = value.as_i64().unwrap_or_default();
    let float = value.as_f64().unwrap_or_default();

    match kind {
        PrimitiveKind::Long => Value::Long(if is_float { float as i64 } else { int }),
        PrimitiveKind::Int => Value::Int(if is_float { float as i32 } else { int as i32 }),
        PrimitiveKind::Short => Value::Short(if is_float {
            float as i32 as i16
        } else {
            int as i16
        }),
        PrimitiveKind::Byte => Value::Byte(if is_float { float as i32 as i8 } else { int as i8 }),
        PrimitiveKind::Float => Value::Float(if is_float { float as f32 } else { int as f32 }),
        PrimitiveKind::Double => Value::Double(if is_float { float } else { int as f64 }),
        PrimitiveKind::Boolean | PrimitiveKind::Char => value.clone(),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{TypeMeta, TypeRegistry};
    use proptest::prelude::*;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(TypeMeta::enumeration("s.Parity", &["EVEN", "ODD"]));
        registry
    }

    fn descriptor(spec: &str) -> OperationDescriptor {
        OperationDescriptor::parse(spec).unwrap()
    }

    #[test]
    fn undeclared_types_pass_input_through() {
        let registry = registry();
        let d = descriptor("s.Sample#echo");
        assert_eq!(convert_args(&d, None, &registry).unwrap(), Vec::<Value>::new());
        assert_eq!(
            convert_args(&d, Some(Value::Int(5)), &registry).unwrap(),
            vec![Value::Int(5)]
        );
    }

    #[test]
    fn declared_long_widens_an_int() {
        let registry = registry();
        let args = convert_args(&descriptor("s.Sample#echo(long)"), Some(Value::Int(5)), &registry)
            .unwrap();
        assert_eq!(args, vec![Value::Long(5)]);
    }

    #[test]
    fn absent_input_with_declared_type_is_null() {
        let registry = registry();
        let args = convert_args(&descriptor("s.Sample#echo(Long)"), None, &registry).unwrap();
        assert_eq!(args, vec![Value::Null]);
    }

    #[test]
    fn text_target_stringifies() {
        let registry = registry();
        let v = coerce_value(&TypeRef::Text, Value::Int(12), &registry).unwrap();
        assert_eq!(v, Value::text("12"));
    }

    #[test]
    fn enum_target_matches_case_sensitively() {
        let registry = registry();
        let target = TypeRef::named("s.Parity");
        assert_eq!(
            coerce_value(&target, Value::text("ODD"), &registry).unwrap(),
            Value::Enum {
                type_name: "s.Parity".to_string(),
                variant: "ODD".to_string()
            }
        );
        assert!(matches!(
            coerce_value(&target, Value::text("odd"), &registry),
            Err(DebuggerError::InvalidArguments(_))
        ));
    }

    #[test]
    fn unrelated_values_pass_through() {
        let registry = registry();
        let doc = Value::List(vec![Value::Int(1)]);
        assert_eq!(
            coerce_value(&TypeRef::named("s.Other"), doc.clone(), &registry).unwrap(),
            doc
        );
    }

    #[test]
    fn narrowing_wraps_and_float_conversion_saturates() {
        assert_eq!(coerce_numeric(&Value::Long(300), PrimitiveKind::Byte), Value::Byte(44));
        assert_eq!(coerce_numeric(&Value::Double(1e20), PrimitiveKind::Int), Value::Int(i32::MAX));
        assert_eq!(coerce_numeric(&Value::Double(2.9), PrimitiveKind::Long), Value::Long(2));
    }

    fn back_to_i64(v: &Value) -> i64 {
        v.as_i64().expect("numeric")
    }

    proptest! {
        #[test]
        fn integral_round_trip_within_range(n in any::<i64>()) {
            let decoded = Value::from_json(&serde_json::json!(n));
            let kinds = [
                (PrimitiveKind::Long, i64::MIN as f64, i64::MAX as f64),
                (PrimitiveKind::Int, i32::MIN as f64, i32::MAX as f64),
                (PrimitiveKind::Short, i16::MIN as f64, i16::MAX as f64),
                (PrimitiveKind::Byte, i8::MIN as f64, i8::MAX as f64),
            ];
            for (kind, lo, hi) in kinds {
                if (n as f64) >= lo && (n as f64) <= hi {
                    let coerced = coerce_numeric(&decoded, kind);
                    prop_assert_eq!(back_to_i64(&coerced), n);
                    let back = coerce_numeric(&coerced, PrimitiveKind::Long);
                    prop_assert_eq!(back, Value::Long(n));
                }
            }
        }

        #[test]
        fn floating_round_trip_for_exactly_representable(n in -(1i64 << 24)..(1i64 << 24)) {
            let decoded = Value::from_json(&serde_json::json!(n));
            for kind in [PrimitiveKind::Float, PrimitiveKind::Double] {
                let coerced = coerce_numeric(&decoded, kind);
                prop_assert_eq!(coerce_numeric(&coerced, PrimitiveKind::Long), Value::Long(n));
            }
        }
    }
}
