//! Control API and its HTTP transport.
//!
//! [`ControlApi`] maps protocol requests onto the session manager and decides
//! the response status; [`router`] exposes it over HTTP:
//!
//! | Method | Path                     | Body / query          |
//! |--------|--------------------------|-----------------------|
//! | POST   | `/api/debug/start`       | `StartRequest`        |
//! | POST   | `/api/debug/next`        | `NextRequest`         |
//! | GET    | `/api/debug/tree`        | `?sessionId=`         |
//! | GET    | `/api/debug/topology`    | `?sessionId=`         |
//! | GET    | `/healthz`               |                       |

mod handlers;

use crate::debugger::DebugSessionManager;
use crate::protocol::{
    ControlRequest, NextResponse, StartResponse, TopologyResponse, TreeResponse,
};
use crate::{DebuggerError, Result};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// A status plus the JSON document to send back.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlReply {
    pub status: StatusCode,
    pub body: JsonValue,
}

impl ControlReply {
    fn new(status: StatusCode, body: &impl Serialize) -> Self {
        let body = serde_json::to_value(body).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to encode response document");
            serde_json::json!({ "success": false, "error": e.to_string() })
        });
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        self.body["success"] == JsonValue::Bool(true)
    }
}

/// Synchronous request/response mapping onto the session manager.
pub struct ControlApi {
    manager: Arc<DebugSessionManager>,
}

impl ControlApi {
    pub fn new(manager: Arc<DebugSessionManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<DebugSessionManager> {
        &self.manager
    }

    /// Handle one request. `Start` executes the target on the calling thread.
    pub fn handle(&self, request: ControlRequest) -> ControlReply {
        match request {
            ControlRequest::Start(req) => {
                let response = match self.manager.start(&req.target_specifier, req.input.as_ref()) {
                    Ok(session) => StartResponse::from_session(&session),
                    Err(e) => {
                        warn!(target = %req.target_specifier, error = %e, "Start rejected");
                        StartResponse::failure(e.to_string())
                    }
                };
                ControlReply::new(StatusCode::OK, &response)
            }
            ControlRequest::Next(req) => match self.manager.next(&req.session_id) {
                Ok((session, step)) => {
                    ControlReply::new(StatusCode::OK, &NextResponse::from_step(&session, &step))
                }
                Err(e) => ControlReply::new(status_of(&e), &NextResponse::failure(e.to_string())),
            },
            ControlRequest::Tree(query) => match self.manager.session(&query.session_id) {
                Ok(session) => ControlReply::new(StatusCode::OK, &TreeResponse::from_session(&session)),
                Err(e) => ControlReply::new(status_of(&e), &TreeResponse::failure(e.to_string())),
            },
            ControlRequest::Topology(query) => match self.manager.session(&query.session_id) {
                Ok(session) => {
                    ControlReply::new(StatusCode::OK, &TopologyResponse::from_session(&session))
                }
                Err(e) => ControlReply::new(status_of(&e), &TopologyResponse::failure(e.to_string())),
            },
        }
    }

    /// Reply for a body or query that could not be decoded.
    pub fn malformed(detail: impl Into<String>) -> ControlReply {
        ControlReply::new(
            StatusCode::BAD_REQUEST,
            &StartResponse::failure(format!("malformed request: {}", detail.into())),
        )
    }
}

fn status_of(err: &DebuggerError) -> StatusCode {
    match err {
        DebuggerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn router(api: Arc<ControlApi>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/debug/start", post(handlers::start))
        .route("/api/debug/next", post(handlers::next))
        .route("/api/debug/tree", get(handlers::tree))
        .route("/api/debug/topology", get(handlers::topology))
        .layer(TraceLayer::new_for_http())
        .with_state(api)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(api: Arc<ControlApi>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(api, listener).await
}

pub async fn serve_listener(api: Arc<ControlApi>, listener: TcpListener) -> Result<()> {
    info!(addr = %listener.local_addr()?, "Control server listening");
    axum::serve(listener, router(api)).await?;
    Ok(())
}
