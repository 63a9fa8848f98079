//! Per-execution-context call recording.
//!
//! Each thread owns at most one timeline. A debug session activates it with
//! [`CallRecorder::start`], executes the target on the same thread, and takes
//! the finalized steps back with [`RecorderScope::finish`]. While no timeline
//! is active, [`CallRecorder::record`] returns immediately and the
//! [`Traced`] decorator forwards calls untouched.
//!
//! Timelines never cross threads, so concurrent sessions running on different
//! worker threads cannot interleave their records.

mod traced;

pub use traced::Traced;
pub(crate) use traced::panic_message;

use crate::debugger::Step;
use crate::host::Value;
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::marker::PhantomData;

#[derive(Default)]
struct Timeline {
    steps: Vec<Step>,
    depth: usize,
}

thread_local! {
    static TIMELINE: RefCell<Option<Timeline>> = const { RefCell::new(None) };
}

/// Handle to the calling thread's recorder timeline.
pub struct CallRecorder;

impl CallRecorder {
    /// Reset the timeline and mark it active.
    pub fn start() -> RecorderScope {
        TIMELINE.with(|t| *t.borrow_mut() = Some(Timeline::default()));
        RecorderScope {
            finished: false,
            _thread_bound: PhantomData,
        }
    }

    pub fn is_active() -> bool {
        TIMELINE.with(|t| t.borrow().is_some())
    }

    /// Append a finalized step at the current nesting depth. No-op when
    /// inactive.
    pub fn record(
        type_name: &str,
        operation_name: &str,
        args: Vec<Value>,
        return_value: Option<Value>,
        error_text: Option<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) {
        TIMELINE.with(|t| {
            if let Some(timeline) = t.borrow_mut().as_mut() {
                let depth = timeline.depth;
                timeline.steps.push(Step::finalized(
                    type_name,
                    operation_name,
                    args,
                    return_value,
                    error_text,
                    start,
                    end,
                    depth,
                ));
            }
        });
    }

    /// Mark inactive and hand back the timeline, leaving it empty.
    pub fn end_and_get() -> Vec<Step> {
        TIMELINE.with(|t| t.borrow_mut().take().map(|tl| tl.steps).unwrap_or_default())
    }

    /// Enter an intercepted call. Returns the call's depth when active.
    pub(crate) fn enter() -> Option<usize> {
        TIMELINE.with(|t| {
            t.borrow_mut().as_mut().map(|timeline| {
                let depth = timeline.depth;
                timeline.depth += 1;
                depth
            })
        })
    }

    /// Leave an intercepted call and append its step at `depth`.
    pub(crate) fn exit(depth: usize, step: impl FnOnce(usize) -> Step) {
        TIMELINE.with(|t| {
            if let Some(timeline) = t.borrow_mut().as_mut() {
                timeline.depth = timeline.depth.saturating_sub(1);
                timeline.steps.push(step(depth));
            }
        });
    }
}

/// Active-timeline guard. Dropping it without [`finish`](Self::finish)
/// discards the timeline so nothing leaks into later work on the thread.
#[must_use = "dropping the scope discards the recorded steps"]
pub struct RecorderScope {
    finished: bool,
    _thread_bound: PhantomData<*const ()>,
}

impl RecorderScope {
    pub fn finish(mut self) -> Vec<Step> {
        self.finished = true;
        CallRecorder::end_and_get()
    }
}

impl Drop for RecorderScope {
    fn drop(&mut self) {
        if !self.finished {
            CallRecorder::end_and_get();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_one(name: &str) {
        let now = Utc::now();
        CallRecorder::record("t.Type", name, vec![], None, None, now, now);
    }

    #[test]
    fn record_is_a_no_op_when_inactive() {
        assert!(!CallRecorder::is_active());
        record_one("ignored");
        let scope = CallRecorder::start();
        assert!(scope.finish().is_empty());
    }

    #[test]
    fn start_resets_and_finish_deactivates() {
        let scope = CallRecorder::start();
        record_one("first");
        drop(scope);
        assert!(!CallRecorder::is_active());

        let scope = CallRecorder::start();
        record_one("second");
        let steps = scope.finish();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].operation_name(), "second");
        assert!(!CallRecorder::is_active());
        assert!(CallRecorder::end_and_get().is_empty());
    }

    #[test]
    fn timelines_are_per_thread() {
        let scope = CallRecorder::start();
        std::thread::spawn(|| {
            assert!(!CallRecorder::is_active());
            record_one("other-thread");
        })
        .join()
        .unwrap();
        record_one("this-thread");
        let steps = scope.finish();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].operation_name(), "this-thread");
    }
}
