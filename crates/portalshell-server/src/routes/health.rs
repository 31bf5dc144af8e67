//! Health check endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` while the shell task is running, `degraded` otherwise.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Number of frames the shell holds.
    pub frames: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, frames) = match state.shell.snapshot().await {
        Ok(snapshot) => ("ok", snapshot.frames.len()),
        Err(_) => ("degraded", 0),
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        frames,
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
