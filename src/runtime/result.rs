//! Result types and formatting helpers for sandboxed execution.

use crate::host::{CallResult, Value};
use crate::DebuggerError;
use serde::Serialize;
use tracing::{info, warn};

/// How the target operation was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionStrategy {
    /// Through a disposable container, so collaborators are wired and traced.
    Container,
    /// On a fresh instance loaded from the sandbox namespace.
    Freestanding,
}

/// Outcome of one sandboxed execution.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub strategy: ExecutionStrategy,
    pub arguments: Vec<Value>,
    pub result: std::result::Result<Value, String>,
}

impl ExecutionRecord {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The returned value, with null reported as absent.
    pub fn return_value(&self) -> Option<Value> {
        match &self.result {
            Ok(value) if !value.is_null() => Some(value.clone()),
            _ => None,
        }
    }

    pub fn error_text(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }
}

/// Turn an invocation result into the stored outcome. A wrapped failure is
/// reported by the innermost failure of its cause chain.
pub(super) fn format_call_result(result: CallResult) -> std::result::Result<Value, String> {
    match result {
        Ok(value) => {
            info!("Operation executed successfully");
            Ok(value)
        }
        Err(failure) => {
            let text = failure.innermost().to_string();
            warn!(error = %text, "Operation raised a failure");
            Err(text)
        }
    }
}

/// Engine errors raised while preparing the call are reported like failures.
pub(super) fn format_engine_error(err: &DebuggerError) -> String {
    warn!(error = %err, "Execution could not proceed");
    err.to_string()
}
