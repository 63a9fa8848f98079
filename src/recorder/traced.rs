use super::CallRecorder;
use crate::debugger::Step;
use crate::host::{CallResult, Component, OperationMeta, SharedComponent, Value};
use chrono::Utc;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Observing decorator for business-layer components.
///
/// When the calling thread has an active recorder, the call's arguments and
/// outcome are appended as a step. The wrapped call's value, failure or panic
/// is passed through unchanged.
pub struct Traced {
    inner: SharedComponent,
}

impl Traced {
    pub fn new(inner: SharedComponent) -> Self {
        Self { inner }
    }
}

impl Component for Traced {
    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn invoke(&self, operation: &OperationMeta, args: Vec<Value>) -> CallResult {
        let Some(depth) = CallRecorder::enter() else {
            return self.inner.invoke(operation, args);
        };

        let recorded_args = args.clone();
        let start = Utc::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.inner.invoke(operation, args)
        }));
        let end = Utc::now();

        let (return_value, error_text) = match &outcome {
            Ok(Ok(value)) if value.is_null() => (None, None),
            Ok(Ok(value)) => (Some(value.clone()), None),
            Ok(Err(failure)) => (None, Some(failure.to_string())),
            Err(payload) => (None, Some(format!("panic: {}", panic_message(payload.as_ref())))),
        };
        CallRecorder::exit(depth, |depth| {
            Step::finalized(
                self.inner.type_name(),
                &operation.name,
                recorded_args,
                return_value,
                error_text,
                start,
                end,
                depth,
            )
        });

        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
