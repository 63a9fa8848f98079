use crate::host::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a recorded call's type comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceType {
    #[default]
    Project,
    External,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Project => "PROJECT",
            SourceType::External => "EXTERNAL",
        }
    }
}

/// One recorded call. Immutable once finalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    id: String,
    type_name: String,
    operation_name: String,
    source_type: SourceType,
    arguments: Vec<Value>,
    return_value: Option<Value>,
    error_text: Option<String>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    duration_millis: i64,
    depth: usize,
}

impl Step {
    /// Finalize a call. `end_time` is clamped so it never precedes
    /// `start_time`.
    #[allow(clippy::too_many_arguments)]
    pub fn finalized(
        type_name: impl Into<String>,
        operation_name: impl Into<String>,
        arguments: Vec<Value>,
        return_value: Option<Value>,
        error_text: Option<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        depth: usize,
    ) -> Self {
        let end_time = end_time.max(start_time);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            type_name: type_name.into(),
            operation_name: operation_name.into(),
            source_type: SourceType::Project,
            arguments,
            return_value,
            error_text,
            start_time,
            end_time,
            duration_millis: (end_time - start_time).num_milliseconds(),
            depth,
        }
    }

    pub fn with_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = source_type;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    /// `TypeName#operation`.
    pub fn display_name(&self) -> String {
        format!("{}#{}", self.type_name, self.operation_name)
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    pub fn error_text(&self) -> Option<&str> {
        self.error_text.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.error_text.is_some()
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn duration_millis(&self) -> i64 {
        self.duration_millis
    }

    /// Nesting depth among intercepted calls; 0 is outermost.
    pub fn depth(&self) -> usize {
        self.depth
    }
}
