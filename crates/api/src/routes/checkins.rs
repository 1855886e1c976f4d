//! Route definitions for car check-in.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::checkins;
use crate::state::AppState;

/// Routes mounted at `/checkins`.
///
/// ```text
/// POST   /                  -> check_in
/// POST   /typed             -> check_in_typed
/// POST   /scan              -> resolve_scan
/// GET    /preview/{car}     -> preview
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(checkins::check_in))
        .route("/typed", post(checkins::check_in_typed))
        .route("/scan", post(checkins::resolve_scan))
        .route("/preview/{car}", get(checkins::preview))
}
