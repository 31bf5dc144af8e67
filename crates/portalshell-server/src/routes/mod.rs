//! Route modules organized by resource.

use axum::Router;

use crate::state::AppState;

pub mod contexts;
pub mod frames;
pub mod health;
pub mod navigation;

/// Returns the full application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/contexts", contexts::router())
        .nest("/api/v1/frames", frames::router())
        .nest("/api/v1/navigation", navigation::router())
}
