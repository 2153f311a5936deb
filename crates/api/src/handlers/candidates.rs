//! Handlers for the `/candidates` admin resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use modelpick_core::error::CoreError;
use modelpick_core::types::DbId;
use modelpick_db::models::candidate::{Candidate, CandidateStatus, UpsertCandidateInput};
use modelpick_db::repositories::CandidateRepo;

use crate::error::AppResult;
use crate::response::ListResponse;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 500;

/// Query parameters for listing candidates (`?status=&limit=&offset=`).
#[derive(Debug, Deserialize)]
pub struct CandidateListQuery {
    pub status: Option<CandidateStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/candidates
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CandidateListQuery>,
) -> AppResult<Json<ListResponse<Candidate>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);
    let candidates = CandidateRepo::list(&state.pool, query.status, limit, offset).await?;
    Ok(Json(ListResponse { data: candidates }))
}

/// POST /api/v1/candidates
///
/// Upserts on (provider, name, version); re-registering a candidate
/// updates its registry fields in place.
pub async fn upsert(
    State(state): State<AppState>,
    Json(input): Json<UpsertCandidateInput>,
) -> AppResult<(StatusCode, Json<Candidate>)> {
    input.validate()?;
    let candidate = CandidateRepo::upsert(&state.pool, &input).await?;
    tracing::info!(
        candidate_id = candidate.id,
        provider = %candidate.provider,
        name = %candidate.name,
        "Candidate registered"
    );
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// GET /api/v1/candidates/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Candidate>> {
    let candidate = CandidateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "candidate",
            id,
        })?;
    Ok(Json(candidate))
}

/// POST /api/v1/candidates/{id}/deactivate
///
/// Removes the candidate from future ranking pools. Past decisions keep
/// referencing it.
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Candidate>> {
    set_status(&state, id, CandidateStatus::Inactive).await
}

/// POST /api/v1/candidates/{id}/reactivate
pub async fn reactivate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Candidate>> {
    set_status(&state, id, CandidateStatus::Active).await
}

async fn set_status(
    state: &AppState,
    id: DbId,
    status: CandidateStatus,
) -> AppResult<Json<Candidate>> {
    let candidate = CandidateRepo::set_status(&state.pool, id, status)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "candidate",
            id,
        })?;
    tracing::info!(
        candidate_id = candidate.id,
        status = %candidate.status,
        "Candidate status changed"
    );
    Ok(Json(candidate))
}
