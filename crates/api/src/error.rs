//! Error surface of the HTTP layer.
//!
//! Every failure leaving a handler serializes as `{ "error": <message>,
//! "code": <SCREAMING_CODE> }` with a matching status. Domain errors come
//! in through `From` impls, so handlers stay on `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use modelpick_core::error::CoreError;
use modelpick_engine::EngineError;

/// Anything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Engine(err) => engine_response(err),
            AppError::Core(err) => core_response(err),
            AppError::Database(err) => db_response(err),
        };

        let body = json!({ "error": message, "code": code });
        (status, axum::Json(body)).into_response()
    }
}

type Mapped = (StatusCode, &'static str, String);

fn engine_response(err: &EngineError) -> Mapped {
    match err {
        EngineError::InvalidRequest(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        EngineError::NoCandidateAvailable { segment_key } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "NO_CANDIDATE",
            format!("No candidate available for segment {segment_key}"),
        ),
        EngineError::StoreUnavailable(inner) => {
            tracing::error!(error = %inner, "Decision store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "The decision store is unavailable".to_string(),
            )
        }
        EngineError::DecisionNotFound { id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("decision with id {id} not found"),
        ),
        EngineError::OutcomeAlreadyRecorded { decision_id } => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("decision {decision_id} already has an outcome"),
        ),
    }
}

fn core_response(err: &CoreError) -> Mapped {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// `RowNotFound` is a 404 and a `uq_`-named unique violation is a 409;
/// every other database failure stays a sanitized 500.
fn db_response(err: &sqlx::Error) -> Mapped {
    if matches!(err, sqlx::Error::RowNotFound) {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
        }
    }

    tracing::error!(error = %err, "Database error");
    internal()
}

fn internal() -> Mapped {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
