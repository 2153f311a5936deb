//! Handlers for the `/health-guard` resource.
//!
//! This is the external feedback path: callers report provider or
//! candidate failures here and the guard keeps them out of future pools
//! until the break expires or is closed.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use modelpick_db::models::guard::{
    CircuitBreaker, CloseBreakerInput, LkgEntry, ReportFailureInput,
};

use crate::error::AppResult;
use crate::state::AppState;

/// Current guard state: open breakers and valid last-known-good entries.
#[derive(Debug, Serialize)]
pub struct GuardView {
    pub breakers: Vec<CircuitBreaker>,
    pub lkg: Vec<LkgEntry>,
}

/// POST /api/v1/health-guard/report
pub async fn report(
    State(state): State<AppState>,
    Json(input): Json<ReportFailureInput>,
) -> AppResult<(StatusCode, Json<CircuitBreaker>)> {
    let breaker = state.guard.report_failure(&input).await?;
    Ok((StatusCode::CREATED, Json(breaker)))
}

/// POST /api/v1/health-guard/close
pub async fn close(
    State(state): State<AppState>,
    Json(input): Json<CloseBreakerInput>,
) -> AppResult<Json<serde_json::Value>> {
    let closed = state.guard.close_breaker(&input).await?;
    Ok(Json(serde_json::json!({ "closed": closed })))
}

/// GET /api/v1/health-guard
pub async fn view(State(state): State<AppState>) -> AppResult<Json<GuardView>> {
    let breakers = state.guard.list_open().await?;
    let lkg = state.guard.lkg_list().await?;
    Ok(Json(GuardView { breakers, lkg }))
}
