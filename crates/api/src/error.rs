use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use carline_core::error::CoreError;
use serde_json::json;

/// Error returned by every handler.
///
/// All failures originate in the services as [`CoreError`]; this wrapper
/// only gives them an HTTP shape: a status and a `{ "error", "code" }` body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Core(core) = &self;
        let (status, code, message) = classify_core_error(core);

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error to an HTTP status, error code, and client message.
///
/// Store outages are 503 so clients know a retry may succeed; the rejected
/// empty check-in is 422 so the console can offer the override.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::AlreadyCompleted { .. } => {
            (StatusCode::CONFLICT, "ALREADY_COMPLETED", err.to_string())
        }
        CoreError::NoStudentsFound { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "NO_STUDENTS_FOUND",
            err.to_string(),
        ),
        CoreError::StoreUnavailable(msg) => {
            tracing::warn!(error = %msg, "Store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "The record store is unavailable, try again shortly".to_string(),
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use carline_core::car_number::CarNumber;

    use super::*;

    #[test]
    fn status_codes_follow_the_error_table() {
        let cases = [
            (CoreError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (
                CoreError::NotFound {
                    entity: "queue_entry",
                    id: 1,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::AlreadyCompleted {
                    id: 1,
                    completed_at: chrono::Utc::now(),
                },
                StatusCode::CONFLICT,
            ),
            (
                CoreError::NoStudentsFound {
                    car_number: CarNumber::new(9).unwrap(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CoreError::StoreUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CoreError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let (_, code, message) = classify_core_error(&CoreError::Internal("secret".into()));
        assert_eq!(code, "INTERNAL_ERROR");
        assert!(!message.contains("secret"));
    }
}
