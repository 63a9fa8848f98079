//! Bundled sample host program.
//!
//! - `demo.util.Sample` is a plain utility type run freestanding.
//! - `demo.user.*` is a small user directory with controller, service and
//!   repository layers, run through the container so nested calls are
//!   recorded.

mod users;
mod util;

pub use users::{
    TEAM, USER, USER_CONTROLLER, USER_REPOSITORY, USER_SERVICE, USER_SERVICE_IMPL,
};
pub use util::{PARITY, SAMPLE};

use crate::host::{ComponentCatalog, Failure, HostProgram, TypeRegistry, Value};
use crate::Result;

/// Type registry of the demo program.
pub fn types() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    util::register_types(&mut registry);
    users::register_types(&mut registry);
    registry
}

pub fn catalog() -> ComponentCatalog {
    let mut catalog = ComponentCatalog::new();
    util::register_components(&mut catalog);
    users::register_components(&mut catalog);
    catalog
}

/// The demo program packaged with every registered type as a module.
pub fn program() -> Result<HostProgram> {
    HostProgram::packaged("demo", types(), catalog())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn illegal_argument(message: impl Into<String>) -> Failure {
    Failure::new("IllegalArgumentException", message)
}

fn arg<'a>(args: &'a [Value], index: usize) -> std::result::Result<&'a Value, Failure> {
    args.get(index)
        .ok_or_else(|| illegal_argument(format!("missing argument #{}", index)))
}

fn long_arg(args: &[Value], index: usize) -> std::result::Result<i64, Failure> {
    let value = arg(args, index)?;
    match value {
        Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Long(_) => {
            value.as_i64().ok_or_else(|| illegal_argument("not a number"))
        }
        other => Err(illegal_argument(format!(
            "expected an integral number, got {}",
            other.kind_name()
        ))),
    }
}

fn text_arg(args: &[Value], index: usize) -> std::result::Result<String, Failure> {
    match arg(args, index)? {
        Value::Text(s) => Ok(s.clone()),
        other => Err(illegal_argument(format!("expected text, got {}", other.kind_name()))),
    }
}
