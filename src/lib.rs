//! Single-operation debug-and-replay engine.
//!
//! Given a target specifier such as `demo.util.Sample#echo(long)`, the engine
//! resolves the minimal module closure of the operation, executes it once in a
//! sandbox (container-managed or freestanding), records every nested call into
//! the program's business layers, and exposes the ordered call sequence as a
//! steppable [`DebugSession`].

pub mod cli;
pub mod config;
pub mod debugger;
pub mod demo;
pub mod host;
pub mod protocol;
pub mod recorder;
pub mod resolver;
pub mod runtime;
pub mod server;

pub use debugger::{DebugSession, DebugSessionManager, SessionState, Step};
pub use resolver::{ModuleClosure, OperationDescriptor};

use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Resolution-time variants abort `start` before any session exists.
/// `InvocationError` is normally absorbed into a session's root step and only
/// escapes when an invocation is driven outside the session manager.
#[derive(Debug, Error)]
pub enum DebuggerError {
    #[error("Malformed target specifier: {0}")]
    ParseError(String),

    #[error("Type not found: {0}")]
    TypeNotFound(String),

    #[error("Operation '{operation}' not found on type {type_name}")]
    OperationNotFound {
        type_name: String,
        operation: String,
    },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Invocation failed: {0}")]
    InvocationError(String),

    #[error("session not found")]
    SessionNotFound(String),

    #[error("Module load failed: {0}")]
    ModuleLoadError(String),

    #[error("Container error: {0}")]
    ContainerError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DebuggerError>;
