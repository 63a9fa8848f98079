use super::{ControlApi, ControlReply};
use crate::protocol::{ControlRequest, NextRequest, SessionQuery, StartRequest, StartResponse};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

type ApiState = State<Arc<ControlApi>>;

impl IntoResponse for ControlReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub(super) async fn healthz(State(api): ApiState) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "sessions": api.manager().len() }))
}

pub(super) async fn start(
    State(api): ApiState,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> ControlReply {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return ControlApi::malformed(rejection.body_text()),
    };

    // The target runs synchronously and is recorded on its own thread.
    match tokio::task::spawn_blocking(move || api.handle(ControlRequest::Start(request))).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "Start task did not complete");
            ControlReply::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                &StartResponse::failure(format!("start task failed: {}", e)),
            )
        }
    }
}

pub(super) async fn next(
    State(api): ApiState,
    body: Result<Json<NextRequest>, JsonRejection>,
) -> ControlReply {
    match body {
        Ok(Json(request)) => api.handle(ControlRequest::Next(request)),
        Err(rejection) => ControlApi::malformed(rejection.body_text()),
    }
}

pub(super) async fn tree(
    State(api): ApiState,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> ControlReply {
    match query {
        Ok(Query(query)) => api.handle(ControlRequest::Tree(query)),
        Err(rejection) => ControlApi::malformed(rejection.body_text()),
    }
}

pub(super) async fn topology(
    State(api): ApiState,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> ControlReply {
    match query {
        Ok(Query(query)) => api.handle(ControlRequest::Topology(query)),
        Err(rejection) => ControlApi::malformed(rejection.body_text()),
    }
}
