//! Routes driving the headless history: explicit navigation and the
//! back/forward buttons.

use axum::extract::State;
use axum::{Json, Router, routing::get, routing::post};
use portalshell_orchestrator::{ShellEvent, ShellOutcome};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::headless::HistoryView;
use crate::state::AppState;

/// Request body for POST /open.
#[derive(Debug, Deserialize)]
pub struct OpenRequest {
    /// World address, absolute or relative to the current location.
    pub address: String,
}

/// POST /open
#[instrument(skip(state, request), fields(address = %request.address))]
async fn open(
    State(state): State<AppState>,
    Json(request): Json<OpenRequest>,
) -> Result<Json<ShellOutcome>, ApiError> {
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, "handling explicit navigation");

    let outcome = state
        .shell
        .handle(ShellEvent::Navigate {
            address: request.address,
        })
        .await?;

    Ok(Json(outcome))
}

/// POST /back
#[instrument(skip(state))]
async fn back(State(state): State<AppState>) -> Result<Json<ShellOutcome>, ApiError> {
    let entry_state = state.navigation.back().ok_or(ApiError::HistoryEdge("back"))?;
    pop_state(&state, entry_state).await
}

/// POST /forward
#[instrument(skip(state))]
async fn forward(State(state): State<AppState>) -> Result<Json<ShellOutcome>, ApiError> {
    let entry_state = state
        .navigation
        .forward()
        .ok_or(ApiError::HistoryEdge("forward"))?;
    pop_state(&state, entry_state).await
}

async fn pop_state(
    state: &AppState,
    entry_state: serde_json::Value,
) -> Result<Json<ShellOutcome>, ApiError> {
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, "dispatching pop-state");

    let outcome = state
        .shell
        .handle(ShellEvent::PopState {
            state: Some(entry_state),
        })
        .await?;

    Ok(Json(outcome))
}

/// GET /history
async fn history(State(state): State<AppState>) -> Json<HistoryView> {
    Json(state.navigation.view())
}

/// Returns the router for navigation.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/open", post(open))
        .route("/back", post(back))
        .route("/forward", post(forward))
        .route("/history", get(history))
}
