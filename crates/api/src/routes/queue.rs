//! Route definitions for the pickup queue.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::queue;
use crate::state::AppState;

/// Routes mounted at `/queue`.
///
/// ```text
/// GET    /                  -> active_queue
/// GET    /history           -> history (?limit=)
/// GET    /{id}/position     -> position
/// POST   /{id}/complete     -> complete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(queue::active_queue))
        .route("/history", get(queue::history))
        .route("/{id}/position", get(queue::position))
        .route("/{id}/complete", post(queue::complete))
}
