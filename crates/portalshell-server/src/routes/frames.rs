//! Read-only frame inspection.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use portalshell_orchestrator::application::views::ShellSnapshot;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
#[instrument(skip(state))]
async fn list_frames(State(state): State<AppState>) -> Result<Json<ShellSnapshot>, ApiError> {
    Ok(Json(state.shell.snapshot().await?))
}

/// Returns the router for frame inspection.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_frames))
}
