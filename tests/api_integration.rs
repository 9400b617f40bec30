//! HTTP contract tests
//!
//! Drives the router in-process; no socket is opened.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use survey_intake::observer::{Operation, SurveyObserver};
use survey_intake::{build_router, AppState, InMemorySurveyStore};

fn test_app() -> Router {
    build_router(AppState::in_memory())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn submission(org: &str, size: &str) -> Value {
    json!({
        "orgName": org,
        "orgSize": size,
        "industry": "Technology",
        "hasOtel": "yes",
        "email": format!("ops@{}.test", org.to_lowercase()),
    })
}

#[tokio::test]
async fn test_fresh_store_is_empty() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/surveys", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "total": 0, "bySize": [], "byIndustry": [], "byOtel": [] })
    );
}

#[tokio::test]
async fn test_submit_returns_stored_record() {
    let app = test_app();
    let payload = json!({
        "orgName": "Acme",
        "orgSize": "1-10",
        "industry": "Technology",
        "hasOtel": "yes",
        "email": "a@acme.com"
    });

    let (status, body) = send(&app, Method::POST, "/api/surveys", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert!(body["createdAt"].is_string());
    for key in ["orgName", "orgSize", "industry", "hasOtel", "email"] {
        assert_eq!(body[key], payload[key], "field {} should round-trip", key);
    }
}

#[tokio::test]
async fn test_stats_by_size() {
    let app = test_app();
    for (org, size) in [("A", "1-10"), ("B", "1-10"), ("C", "11-50")] {
        let (status, _) = send(&app, Method::POST, "/api/surveys", Some(submission(org, size))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(
        body["bySize"],
        json!([
            { "value": "1-10", "count": 2, "percent": 67 },
            { "value": "11-50", "count": 1, "percent": 33 }
        ])
    );
    assert_eq!(
        body["byOtel"],
        json!([{ "value": "yes", "count": 3, "percent": 100 }])
    );
}

#[tokio::test]
async fn test_missing_email_is_rejected_without_side_effects() {
    let app = test_app();
    send(&app, Method::POST, "/api/surveys", Some(submission("Before", "1-10"))).await;

    let mut payload = submission("Broken", "1-10");
    payload.as_object_mut().unwrap().remove("email");

    let (status, body) = send(&app, Method::POST, "/api/surveys", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"], json!(["email"]));

    let (_, list) = send(&app, Method::GET, "/api/surveys", None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["orgName"], "Before");
}

#[tokio::test]
async fn test_whitespace_only_fields_are_rejected() {
    let app = test_app();
    let payload = json!({
        "orgName": "   ",
        "orgSize": "1-10",
        "industry": "",
        "hasOtel": "no",
        "email": "x@y.test"
    });

    let (status, body) = send(&app, Method::POST, "/api/surveys", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"], json!(["orgName", "industry"]));
}

#[tokio::test]
async fn test_malformed_bodies() {
    let app = test_app();

    for raw in ["{ nope", "[]", "\"just a string\"", ""] {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/surveys")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", raw);
    }

    let (_, list) = send(&app, Method::GET, "/api/surveys", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_oversized_body_gets_json_error() {
    let app = test_app();
    let padding = "x".repeat(3 * 1024 * 1024);
    let raw = json!({
        "orgName": padding,
        "orgSize": "1-10",
        "industry": "Technology",
        "hasOtel": "yes",
        "email": "big@org.test"
    })
    .to_string();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/surveys")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    let (_, list) = send(&app, Method::GET, "/api/surveys", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = test_app();
    for org in ["R1", "R2", "R3"] {
        send(&app, Method::POST, "/api/surveys", Some(submission(org, "51-200"))).await;
    }

    let (status, body) = send(&app, Method::GET, "/api/surveys", None).await;
    assert_eq!(status, StatusCode::OK);
    let orgs: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["orgName"].as_str().unwrap())
        .collect();
    assert_eq!(orgs, vec!["R3", "R2", "R1"]);
}

#[tokio::test]
async fn test_unknown_routes() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));

    // Known path, unsupported method
    let (status, body) = send(&app, Method::DELETE, "/api/surveys", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));

    let (status, _) = send(&app, Method::POST, "/api/stats", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[derive(Default)]
struct CountingObserver {
    counts: Mutex<HashMap<Operation, u64>>,
}

impl CountingObserver {
    fn count(&self, op: Operation) -> u64 {
        self.counts.lock().unwrap().get(&op).copied().unwrap_or(0)
    }
}

impl SurveyObserver for CountingObserver {
    fn operation_succeeded(&self, op: Operation) {
        *self.counts.lock().unwrap().entry(op).or_default() += 1;
    }
}

#[tokio::test]
async fn test_observer_counts_successes_only() {
    let observer = Arc::new(CountingObserver::default());
    let app = build_router(AppState::new(Arc::new(InMemorySurveyStore::new()), observer.clone()));

    send(&app, Method::POST, "/api/surveys", Some(submission("A", "1-10"))).await;
    send(&app, Method::POST, "/api/surveys", Some(json!({ "orgName": "B" }))).await;
    send(&app, Method::GET, "/api/surveys", None).await;
    send(&app, Method::GET, "/api/stats", None).await;
    send(&app, Method::GET, "/api/stats", None).await;
    send(&app, Method::GET, "/nowhere", None).await;

    assert_eq!(observer.count(Operation::Submit), 1);
    assert_eq!(observer.count(Operation::List), 1);
    assert_eq!(observer.count(Operation::Stats), 2);
}

#[tokio::test]
async fn test_observer_does_not_change_results() {
    let observed = build_router(AppState::new(
        Arc::new(InMemorySurveyStore::new()),
        Arc::new(CountingObserver::default()),
    ));
    let plain = test_app();

    for app in [&observed, &plain] {
        for (org, size) in [("A", "1-10"), ("B", "1000+"), ("C", "1-10")] {
            send(app, Method::POST, "/api/surveys", Some(submission(org, size))).await;
        }
    }

    let (_, a) = send(&observed, Method::GET, "/api/stats", None).await;
    let (_, b) = send(&plain, Method::GET, "/api/stats", None).await;
    assert_eq!(a, b);
}
