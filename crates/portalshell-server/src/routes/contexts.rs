//! Routes standing in for the frames' side of the message channel.
//!
//! A client playing a frame posts its messages here under its context handle
//! and drains whatever the shell queued for it.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use portalshell_core::ids::ContextHandle;
use portalshell_core::protocol::OutboundMessage;
use portalshell_orchestrator::{ShellEvent, ShellOutcome};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for GET /{context}/mailbox.
#[derive(Debug, Serialize)]
pub struct MailboxResponse {
    /// Messages queued for the context since the last drain, oldest first.
    pub messages: Vec<OutboundMessage>,
}

/// POST /{context}/messages
#[instrument(skip(state, data))]
async fn post_message(
    State(state): State<AppState>,
    Path(context): Path<u64>,
    Json(data): Json<Value>,
) -> Result<Json<ShellOutcome>, ApiError> {
    let correlation_id = Uuid::new_v4();
    info!(%correlation_id, "routing message from context");

    let outcome = state
        .shell
        .handle(ShellEvent::Message {
            origin: ContextHandle(context),
            data,
        })
        .await?;

    Ok(Json(outcome))
}

/// GET /{context}/mailbox
#[instrument(skip(state))]
async fn drain_mailbox(
    State(state): State<AppState>,
    Path(context): Path<u64>,
) -> Result<Json<MailboxResponse>, ApiError> {
    let context = ContextHandle(context);
    let messages = state
        .frames
        .drain_mailbox(context)
        .ok_or(ApiError::UnknownContext(context))?;
    Ok(Json(MailboxResponse { messages }))
}

/// Returns the router for frame contexts.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{context}/messages", post(post_message))
        .route("/{context}/mailbox", get(drain_mailbox))
}
