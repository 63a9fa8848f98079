use super::types::OperationMeta;
use super::value::Value;
use std::fmt;
use std::sync::Arc;

/// A failure raised by a program operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub type_name: String,
    pub message: String,
    pub cause: Option<Box<Failure>>,
}

impl Failure {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            cause: None,
        }
    }

    pub fn caused_by(mut self, cause: Failure) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The last failure of the cause chain, or `self` when there is none.
    pub fn innermost(&self) -> &Failure {
        let mut current = self;
        while let Some(cause) = current.cause.as_deref() {
            current = cause;
        }
        current
    }

    /// Failure used when a call does not match any declared operation.
    pub fn no_such_operation(type_name: &str, op: &OperationMeta) -> Self {
        Failure::new(
            "NoSuchOperation",
            format!("{} is not implemented by {}", op.signature(), type_name),
        )
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.type_name)
        } else {
            write!(f, "{}: {}", self.type_name, self.message)
        }
    }
}

impl std::error::Error for Failure {}

pub type CallResult = std::result::Result<Value, Failure>;

/// An instance of a program type that can execute its operations.
///
/// Implementations dispatch on `operation.name` (and arity, for overloads).
pub trait Component: Send + Sync {
    fn type_name(&self) -> &str;

    fn invoke(&self, operation: &OperationMeta, args: Vec<Value>) -> CallResult;
}

pub type SharedComponent = Arc<dyn Component>;

/// Fetches container-managed collaborators while a component is being wired.
pub trait Wiring {
    fn collaborator(&self, type_name: &str) -> crate::Result<SharedComponent>;
}

pub type NoArgConstructor = Arc<dyn Fn() -> SharedComponent + Send + Sync>;
pub type WiredConstructor =
    Arc<dyn Fn(&dyn Wiring) -> crate::Result<SharedComponent> + Send + Sync>;
