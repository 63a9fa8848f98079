//! Sandboxed execution sub-system.
//!
//! Sub-modules:
//! - [`executor`] — Public façade; picks a strategy and runs the target once.
//! - [`loader`]   — Isolated module namespace for freestanding execution.
//! - [`invoker`]  — Operation lookup and panic-guarded invocation.
//! - [`parser`]   — Coercion of the untyped input into arguments.
//! - [`result`]   — Execution records and outcome formatting.

pub mod executor;
pub mod invoker;
pub mod loader;
pub mod parser;
pub mod result;

pub use executor::{SandboxExecutor, DEFAULT_MAX_MODULE_BYTES};
pub use loader::{ModuleResolution, SandboxNamespace};
pub use result::{ExecutionRecord, ExecutionStrategy};
