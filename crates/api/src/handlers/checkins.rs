//! Handlers for the check-in flow: preview, then commit.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use carline_core::queue::QueueEntry;
use carline_core::student::Student;
use carline_pickup::ScanPreview;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub car_number: i64,
    /// Operator override for a car with no registered students.
    #[serde(default)]
    pub allow_empty: bool,
}

#[derive(Debug, Deserialize)]
pub struct TypedCheckInRequest {
    /// Raw text from the car number field.
    pub text: String,
    #[serde(default)]
    pub allow_empty: bool,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub code: String,
}

/// GET /checkins/preview/{car}
pub async fn preview(
    State(state): State<AppState>,
    Path(car): Path<i64>,
) -> AppResult<Json<DataResponse<Vec<Student>>>> {
    let students = state.checkin.preview(car).await?;
    Ok(Json(DataResponse { data: students }))
}

/// POST /checkins
///
/// 422 `NO_STUDENTS_FOUND` when the car has no students and `allow_empty`
/// is not set.
pub async fn check_in(
    State(state): State<AppState>,
    Json(input): Json<CheckInRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<QueueEntry>>)> {
    let entry = state
        .checkin
        .check_in(input.car_number, input.allow_empty)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// POST /checkins/typed
pub async fn check_in_typed(
    State(state): State<AppState>,
    Json(input): Json<TypedCheckInRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<QueueEntry>>)> {
    let entry = state
        .checkin
        .check_in_text(&input.text, input.allow_empty)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// POST /checkins/scan
///
/// Resolve a scanned code to a car and its riders. Nothing is written.
pub async fn resolve_scan(
    State(state): State<AppState>,
    Json(input): Json<ScanRequest>,
) -> AppResult<Json<DataResponse<ScanPreview>>> {
    let preview = state.checkin.resolve_scan(&input.code).await?;
    Ok(Json(DataResponse { data: preview }))
}
