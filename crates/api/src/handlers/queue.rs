//! Handlers for the pickup queue.

use axum::extract::{Path, Query, State};
use axum::Json;
use carline_core::queue::{PositionedEntry, QueueEntry};
use carline_core::types::DbId;
use serde::Serialize;

use crate::error::AppResult;
use crate::query::HistoryParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PositionResponse {
    pub queue_id: DbId,
    /// `null` once the entry is completed or if it does not exist.
    pub position: Option<usize>,
}

/// GET /queue
///
/// Waiting entries, front of the line first, each with its cone position.
pub async fn active_queue(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PositionedEntry>>>> {
    let snapshot = state.queue.active_queue().await?;
    Ok(Json(DataResponse {
        data: snapshot.positioned(),
    }))
}

/// GET /queue/history
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<DataResponse<Vec<QueueEntry>>>> {
    let entries = state.queue.history(params.limit).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /queue/{id}/position
pub async fn position(
    State(state): State<AppState>,
    Path(queue_id): Path<DbId>,
) -> AppResult<Json<DataResponse<PositionResponse>>> {
    let position = state.queue.position_of(queue_id).await?;
    Ok(Json(DataResponse {
        data: PositionResponse { queue_id, position },
    }))
}

/// POST /queue/{id}/complete
///
/// 409 `ALREADY_COMPLETED` on a repeated call; the first completion time
/// is kept.
pub async fn complete(
    State(state): State<AppState>,
    Path(queue_id): Path<DbId>,
) -> AppResult<Json<DataResponse<QueueEntry>>> {
    let entry = state.queue.complete(queue_id).await?;
    Ok(Json(DataResponse { data: entry }))
}
