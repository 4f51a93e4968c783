//! Test fixtures: stores, routers and request helpers.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use civic_core::common::{Id, IssueId};
use civic_core::kernel::{CivicSeed, MemoryCivicStore, ServerDeps};
use civic_core::server::{build_app, RateLimit};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Small dataset with one relation of every kind:
/// - mayor covers roads, board covers schools
/// - m-parks relates to parks, m-roads to roads and schools
/// - c-direct runs for board tagged parks, c-office runs for mayor untagged,
///   c-both runs for mayor tagged roads, c-free has no office
pub const SMALL_SEED: &str = r#"{
  "issues": [
    {"id": "parks", "name": "Parks", "count": 10},
    {"id": "roads", "name": "Roads", "count": 20},
    {"id": "schools", "name": "Schools", "count": 30}
  ],
  "offices": [
    {"id": "mayor", "name": "Mayor", "level": "local", "related_issues": ["roads"]},
    {"id": "board", "name": "School Board", "level": "county", "related_issues": ["schools"]}
  ],
  "ballot_measures": [
    {"id": "m-parks", "title": "Parks Levy", "related_issues": ["parks"]},
    {"id": "m-roads", "title": "Road Bond", "related_issues": ["roads", "schools"]}
  ],
  "candidates": [
    {"id": "c-direct", "name": "Direct", "office_id": "board", "related_issues": ["parks"]},
    {"id": "c-office", "name": "Office", "office_id": "mayor", "related_issues": []},
    {"id": "c-both", "name": "Both", "office_id": "mayor", "related_issues": ["roads"]},
    {"id": "c-free", "name": "Free", "related_issues": ["schools"]}
  ]
}"#;

pub fn small_seed() -> CivicSeed {
    CivicSeed::from_json(SMALL_SEED).expect("small seed parses")
}

pub fn small_store() -> MemoryCivicStore {
    MemoryCivicStore::new(small_seed()).expect("small seed builds")
}

pub fn embedded_store() -> MemoryCivicStore {
    MemoryCivicStore::with_embedded_seed().expect("embedded seed builds")
}

/// Router over fresh in-memory stores, without rate limiting.
pub fn test_app(seed: CivicSeed) -> Router {
    let deps = ServerDeps::in_memory(seed).expect("seed builds");
    build_app(deps, vec!["http://localhost:8080".to_string()], None)
}

pub fn rate_limited_app(seed: CivicSeed, limit: RateLimit) -> Router {
    let deps = ServerDeps::in_memory(seed).expect("seed builds");
    build_app(deps, vec!["http://localhost:8080".to_string()], Some(limit))
}

pub fn ids<T>(raw: &[&str]) -> Vec<Id<T>> {
    raw.iter().map(|s| Id::new(*s)).collect()
}

pub fn issue_ids(raw: &[&str]) -> Vec<IssueId> {
    ids(raw)
}

/// Sorted slugs of the `id` fields in a JSON array.
pub fn json_ids(items: &Value) -> Vec<String> {
    let mut out: Vec<String> = items
        .as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|item| item["id"].as_str().expect("item has id").to_string())
        .collect();
    out.sort();
    out
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is JSON")
    };
    (status, value)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

/// GET as a client connected from `peer`, optionally claiming another address
pub async fn get_status_from(
    app: &Router,
    uri: &str,
    peer: SocketAddr,
    forwarded_for: Option<&str>,
) -> StatusCode {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    let mut request = builder.body(Body::empty()).expect("request builds");
    request.extensions_mut().insert(ConnectInfo(peer));

    app.clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
        .status()
}
