//! Handlers for the student directory.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use carline_core::student::{CreateStudent, Student};

use crate::error::AppResult;
use crate::query::SearchParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /students
///
/// The whole roster in directory order, or the name matches for `?q=`.
pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Student>>>> {
    let students = match params.q.as_deref() {
        Some(query) => state.roster.search(query).await?,
        None => state.roster.list_all().await?,
    };
    Ok(Json(DataResponse { data: students }))
}

/// POST /students
pub async fn register_student(
    State(state): State<AppState>,
    Json(input): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<DataResponse<Student>>)> {
    let student = state
        .roster
        .register(&input.first_name, &input.last_name, input.car_number)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: student })))
}

/// POST /students/seed
///
/// Register the demo roster. Calling it twice registers it twice.
pub async fn seed_demo(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<Student>>>)> {
    let students = state.roster.seed_demo().await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: students })))
}

/// GET /students/by-car/{car}
pub async fn students_by_car(
    State(state): State<AppState>,
    Path(car): Path<i64>,
) -> AppResult<Json<DataResponse<Vec<Student>>>> {
    let students = state.roster.find_by_car_number(car).await?;
    Ok(Json(DataResponse { data: students }))
}
