use super::step::Step;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of a debug session. Only the two completed states are ever
/// observable from outside the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    NotStarted,
    Running,
    CompletedSuccess,
    CompletedError,
}

/// One `start` invocation's result: the root call, the nested calls, and a
/// forward-only cursor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSession {
    id: String,
    target_specifier: String,
    steps: Vec<Step>,
    current_step_index: usize,
    created_at: DateTime<Utc>,
}

impl DebugSession {
    /// The root step always sits at index 0.
    pub(crate) fn new(target_specifier: impl Into<String>, root: Step, nested: Vec<Step>) -> Self {
        let mut steps = Vec::with_capacity(nested.len() + 1);
        steps.push(root);
        steps.extend(nested);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            target_specifier: target_specifier.into(),
            steps,
            current_step_index: 0,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target_specifier(&self) -> &str {
        &self.target_specifier
    }

    pub fn root_step(&self) -> &Step {
        &self.steps[0]
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn current_step(&self) -> &Step {
        &self.steps[self.current_step_index]
    }

    pub fn is_at_last_step(&self) -> bool {
        self.current_step_index + 1 >= self.steps.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> SessionState {
        if self.root_step().has_error() {
            SessionState::CompletedError
        } else {
            SessionState::CompletedSuccess
        }
    }

    /// Move the cursor one step forward unless already at the end.
    pub(crate) fn advance(&mut self) -> &Step {
        if !self.is_at_last_step() {
            self.current_step_index += 1;
        }
        self.current_step()
    }
}
