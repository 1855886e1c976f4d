//! Route definitions for the student directory.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::students;
use crate::state::AppState;

/// Routes mounted at `/students`.
///
/// ```text
/// GET    /                  -> list_students (?q=)
/// POST   /                  -> register_student
/// POST   /seed              -> seed_demo
/// GET    /by-car/{car}      -> students_by_car
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(students::list_students).post(students::register_student),
        )
        .route("/seed", post(students::seed_demo))
        .route("/by-car/{car}", get(students::students_by_car))
}
