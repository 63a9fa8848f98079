//! Control-protocol documents.
//!
//! Every response carries an explicit `success` flag. Failure responses carry
//! an `error` string and none of the success fields.

use crate::debugger::{DebugSession, SourceType, Step};
use crate::host::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    #[serde(alias = "targetMethod")]
    pub target_specifier: String,
    #[serde(default)]
    pub input: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextRequest {
    pub session_id: String,
}

/// Query of the read-only `tree` and `topology` views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlRequest {
    Start(StartRequest),
    Next(NextRequest),
    Tree(SessionQuery),
    Topology(SessionQuery),
}

/// Full view of one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub id: String,
    pub type_name: String,
    pub operation_name: String,
    pub source_type: SourceType,
    pub arguments: Vec<Value>,
    pub return_value: Option<Value>,
    pub error_text: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_millis: i64,
    pub depth: usize,
}

impl From<&Step> for StepView {
    fn from(step: &Step) -> Self {
        Self {
            id: step.id().to_string(),
            type_name: step.type_name().to_string(),
            operation_name: step.operation_name().to_string(),
            source_type: step.source_type(),
            arguments: step.arguments().to_vec(),
            return_value: step.return_value().cloned(),
            error_text: step.error_text().map(str::to_string),
            start_time: step.start_time(),
            end_time: step.end_time(),
            duration_millis: step.duration_millis(),
            depth: step.depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    pub id: String,
    pub name: String,
    pub has_error: bool,
    pub index: usize,
    pub is_current: bool,
}

/// Summaries of every step with the cursor marked.
pub fn summarize(session: &DebugSession) -> Vec<StepSummary> {
    let current = session.current_step_index();
    session
        .steps()
        .iter()
        .enumerate()
        .map(|(index, step)| StepSummary {
            id: step.id().to_string(),
            name: step.display_name(),
            has_error: step.has_error(),
            index,
            is_current: index == current,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StartResponse {
    pub fn from_session(session: &DebugSession) -> Self {
        Self {
            success: true,
            session_id: Some(session.id().to_string()),
            step: Some(StepView::from(session.current_step())),
            steps: Some(summarize(session)),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            session_id: None,
            step: None,
            steps: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NextResponse {
    pub fn from_step(session: &DebugSession, step: &Step) -> Self {
        Self {
            success: true,
            step: Some(StepView::from(step)),
            steps: Some(summarize(session)),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            step: None,
            steps: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    pub source_type: SourceType,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TreeResponse {
    /// Root node only; nested calls are not parented.
    pub fn from_session(session: &DebugSession) -> Self {
        let root = session.root_step();
        Self {
            success: true,
            tree: Some(TreeNode {
                name: root.display_name(),
                source_type: root.source_type(),
                children: Vec::new(),
            }),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tree: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyNode {
    pub id: String,
    pub name: String,
    pub source_type: SourceType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<TopologyNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<TopologyEdge>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TopologyResponse {
    /// A single node for the root step's type and no edges.
    pub fn from_session(session: &DebugSession) -> Self {
        let root = session.root_step();
        Self {
            success: true,
            nodes: Some(vec![TopologyNode {
                id: root.id().to_string(),
                name: root.type_name().to_string(),
                source_type: root.source_type(),
            }]),
            edges: Some(Vec::new()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            nodes: None,
            edges: None,
            error: Some(error.into()),
        }
    }
}
