use replay_debugger::demo;
use replay_debugger::protocol::{ControlRequest, NextRequest, SessionQuery, StartRequest};
use replay_debugger::server::{self, ControlApi};
use replay_debugger::DebugSessionManager;
use serde_json::{json, Value as JsonValue};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn api() -> Arc<ControlApi> {
    let manager = DebugSessionManager::new(Arc::new(demo::program().unwrap()));
    Arc::new(ControlApi::new(Arc::new(manager)))
}

fn start(api: &ControlApi, target: &str, input: Option<JsonValue>) -> JsonValue {
    let reply = api.handle(ControlRequest::Start(StartRequest {
        target_specifier: target.to_string(),
        input,
    }));
    assert_eq!(reply.status.as_u16(), 200);
    reply.body
}

#[test]
fn start_returns_session_with_root_step_and_summaries() {
    let api = api();
    let body = start(&api, "demo.user.UserController#getUser(long)", Some(json!(1)));

    assert_eq!(body["success"], true);
    assert!(body["sessionId"].is_string());
    assert!(body.get("error").is_none());
    assert_eq!(body["step"]["typeName"], "demo.user.UserController");
    assert_eq!(body["step"]["operationName"], "getUser");
    assert_eq!(body["step"]["arguments"], json!([1]));
    assert_eq!(body["step"]["sourceType"], "PROJECT");
    assert_eq!(body["step"]["errorText"], JsonValue::Null);

    let steps = body["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0]["name"], "demo.user.UserController#getUser");
    assert_eq!(steps[0]["isCurrent"], true);
    assert_eq!(steps[1]["index"], 1);
    assert_eq!(steps[1]["isCurrent"], false);
}

#[test]
fn start_for_unknown_type_fails_without_session() {
    let api = api();
    let body = start(&api, "demo.nowhere.Ghost#run", None);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("demo.nowhere.Ghost"));
    assert!(body.get("sessionId").is_none());
    assert!(body.get("step").is_none());
    assert!(body.get("steps").is_none());
    assert!(api.manager().is_empty());
}

#[test]
fn failing_target_is_still_a_successful_start() {
    let api = api();
    let body = start(&api, "demo.util.Sample#fail", None);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["step"]["errorText"],
        "IllegalStateException: requested failure"
    );
    assert_eq!(body["steps"][0]["hasError"], true);
}

#[test]
fn next_walks_forward_and_stops_at_the_end() {
    let api = api();
    let body = start(&api, "demo.user.UserController#getUser(long)", Some(json!(1)));
    let session_id = body["sessionId"].as_str().unwrap().to_string();
    let next = || {
        api.handle(ControlRequest::Next(NextRequest {
            session_id: session_id.clone(),
        }))
    };

    let first = next();
    assert_eq!(first.body["step"]["operationName"], "findById");
    assert_eq!(first.body["steps"][1]["isCurrent"], true);
    let second = next();
    assert_eq!(second.body["step"]["typeName"], "demo.user.UserServiceImpl");
    let third = next();
    assert_eq!(third.body["step"]["id"], second.body["step"]["id"]);
    assert_eq!(third.body["steps"][2]["isCurrent"], true);
}

#[test]
fn unknown_session_is_not_found() {
    let api = api();
    let reply = api.handle(ControlRequest::Next(NextRequest {
        session_id: "missing".to_string(),
    }));
    assert_eq!(reply.status.as_u16(), 404);
    assert_eq!(reply.body, json!({ "success": false, "error": "session not found" }));

    let reply = api.handle(ControlRequest::Tree(SessionQuery {
        session_id: "missing".to_string(),
    }));
    assert_eq!(reply.status.as_u16(), 404);
}

#[test]
fn tree_and_topology_describe_the_root_only() {
    let api = api();
    let body = start(&api, "demo.user.UserController#getUser(long)", Some(json!(1)));
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    let tree = api.handle(ControlRequest::Tree(SessionQuery {
        session_id: session_id.clone(),
    }));
    assert_eq!(
        tree.body,
        json!({
            "success": true,
            "tree": {
                "name": "demo.user.UserController#getUser",
                "sourceType": "PROJECT",
                "children": []
            }
        })
    );

    let topology = api.handle(ControlRequest::Topology(SessionQuery { session_id }));
    let nodes = topology.body["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["name"], "demo.user.UserController");
    assert_eq!(nodes[0]["id"], body["step"]["id"]);
    assert_eq!(topology.body["edges"], json!([]));
}

// ── HTTP transport ────────────────────────────────────────────────────────────

async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve_listener(api(), listener));
    addr
}

/// Send one HTTP/1.1 request and return the status code and parsed body.
async fn request(addr: SocketAddr, method: &str, path: &str, body: Option<&str>) -> (u16, JsonValue) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let body = body.unwrap_or("");
    let raw = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    let payload = response
        .split_once("\r\n\r\n")
        .map(|(_, rest)| rest)
        .unwrap_or("");
    let json = serde_json::from_str(payload).unwrap_or(JsonValue::Null);
    (status, json)
}

#[tokio::test]
async fn http_round_trip() {
    let addr = spawn_server().await;

    let (status, health) = request(addr, "GET", "/healthz", None).await;
    assert_eq!(status, 200);
    assert_eq!(health["status"], "ok");

    let (status, started) = request(
        addr,
        "POST",
        "/api/debug/start",
        Some(r#"{"targetMethod":"demo.util.Sample#echo(long)","input":5}"#),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(started["success"], true);
    assert_eq!(started["step"]["returnValue"], 5);
    let session_id = started["sessionId"].as_str().unwrap();

    let (status, next) = request(
        addr,
        "POST",
        "/api/debug/next",
        Some(&json!({ "sessionId": session_id }).to_string()),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(next["step"]["id"], started["step"]["id"]);

    let (status, tree) = request(
        addr,
        "GET",
        &format!("/api/debug/tree?sessionId={}", session_id),
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(tree["tree"]["name"], "demo.util.Sample#echo");
}

#[tokio::test]
async fn http_boundary_rejections() {
    let addr = spawn_server().await;

    let (status, body) = request(addr, "POST", "/api/debug/start", Some("{not json")).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let (status, _) = request(addr, "GET", "/api/debug/start", None).await;
    assert_eq!(status, 405);

    let (status, body) = request(
        addr,
        "POST",
        "/api/debug/next",
        Some(r#"{"sessionId":"missing"}"#),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "session not found");

    let (status, _) = request(addr, "GET", "/api/debug/topology", None).await;
    assert_eq!(status, 400);
}
