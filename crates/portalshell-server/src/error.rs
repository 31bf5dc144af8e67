//! Portal Shell server: error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use portalshell_core::error::ShellError;
use portalshell_core::ids::ContextHandle;
use serde::Serialize;
use thiserror::Error;

use crate::actor::ActorError;

/// Startup and runtime errors for the server binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The shell rejected the request.
    #[error(transparent)]
    Shell(#[from] ShellError),

    /// The shell task is no longer running.
    #[error("shell is shutting down")]
    Unavailable,

    /// No headless context has this handle.
    #[error("unknown context {0}")]
    UnknownContext(ContextHandle),

    /// History cannot move further in this direction.
    #[error("no history entry to go {0}")]
    HistoryEdge(&'static str),
}

impl From<ActorError> for ApiError {
    fn from(err: ActorError) -> Self {
        match err {
            ActorError::Shell(err) => Self::Shell(err),
            ActorError::Shutdown => Self::Unavailable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Self::Shell(ShellError::UnknownOrigin(_)) => (StatusCode::NOT_FOUND, "unknown_origin"),
            Self::Shell(ShellError::UnknownTarget(_)) => (StatusCode::NOT_FOUND, "unknown_target"),
            Self::Shell(ShellError::UnknownPortal(_)) => (StatusCode::NOT_FOUND, "unknown_portal"),
            Self::Shell(ShellError::UnauthorizedTransition { .. }) => {
                (StatusCode::FORBIDDEN, "unauthorized_transition")
            }
            Self::Shell(ShellError::HistoryInconsistency { .. }) => {
                (StatusCode::CONFLICT, "history_inconsistency")
            }
            Self::Shell(ShellError::InvalidAddress(_)) => (StatusCode::BAD_REQUEST, "invalid_address"),
            Self::Shell(ShellError::Protocol(_)) => (StatusCode::BAD_REQUEST, "protocol_error"),
            Self::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "shell_unavailable"),
            Self::UnknownContext(_) => (StatusCode::NOT_FOUND, "unknown_context"),
            Self::HistoryEdge(_) => (StatusCode::CONFLICT, "history_edge"),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
