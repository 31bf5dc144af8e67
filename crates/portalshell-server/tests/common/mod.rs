//! Shared test helpers for server integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use portalshell_core::address::Address;
use portalshell_orchestrator::ShellConfig;
use portalshell_test_support::{FixedClock, MockRng};
use tower::ServiceExt;

use portalshell_server::routes;
use portalshell_server::state::AppState;

/// Location every test shell starts at.
pub const START: &str = "https://worlds.example/lobby";

/// Start a headless shell with a deterministic clock and RNG. Negotiation
/// ticks are slow enough that tests never observe one unless they ask for it.
pub fn start_state() -> AppState {
    start_state_with_interval(Duration::from_secs(60))
}

/// Start a headless shell announcing roles every `interval`.
pub fn start_state_with_interval(interval: Duration) -> AppState {
    let (state, _task) = AppState::start_with(
        ShellConfig {
            negotiation_interval: interval,
            ..ShellConfig::default()
        },
        Address::parse(START).unwrap(),
        Arc::new(FixedClock::at_test_epoch()),
        Box::new(MockRng::default()),
    );
    state
}

/// Build the full app router over `state`. Uses the same route structure as
/// `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    routes::router().with_state(state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
