pub mod checkins;
pub mod health;
pub mod queue;
pub mod students;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                   WebSocket (snapshots + events)
///
/// /students                             list (?q=), register
/// /students/seed                        seed demo roster (POST)
/// /students/by-car/{car}                students in a car
///
/// /checkins                             check a car in (POST)
/// /checkins/typed                       check in from typed text (POST)
/// /checkins/scan                        resolve a scanned code (POST)
/// /checkins/preview/{car}               who rides in a car
///
/// /queue                                active queue with positions
/// /queue/history                        completed pickups (?limit=)
/// /queue/{id}/position                  cone position of an entry
/// /queue/{id}/complete                  mark picked up (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/students", students::router())
        .nest("/checkins", checkins::router())
        .nest("/queue", queue::router())
}
