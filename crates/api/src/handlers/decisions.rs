//! Handlers for the `/decisions` resource: audit reads and outcome intake.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use modelpick_core::error::CoreError;
use modelpick_core::types::DbId;
use modelpick_db::models::decision::{Decision, DecisionListQuery, SnapshotEntry};
use modelpick_db::models::outcome::{Outcome, RecordOutcomeInput};
use modelpick_db::repositories::DecisionRepo;
use modelpick_engine::outcomes;

use crate::error::AppResult;
use crate::response::ListResponse;
use crate::state::AppState;

/// Decision detail with its frozen candidate set and outcome, if any.
#[derive(Debug, Serialize)]
pub struct DecisionDetail {
    pub decision: Decision,
    pub entries: Vec<SnapshotEntry>,
    pub outcome: Option<Outcome>,
}

/// GET /api/v1/decisions
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<DecisionListQuery>,
) -> AppResult<Json<ListResponse<Decision>>> {
    let decisions = DecisionRepo::list(&state.pool, &query).await?;
    Ok(Json(ListResponse { data: decisions }))
}

/// GET /api/v1/decisions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DecisionDetail>> {
    let decision = DecisionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "decision",
            id,
        })?;

    let entries = match DecisionRepo::find_set(&state.pool, decision.candidate_set_id).await? {
        Some(set) => set.decoded_entries().map_err(|e| {
            CoreError::Internal(format!(
                "corrupt candidate set {}: {e}",
                decision.candidate_set_id
            ))
        })?,
        None => vec![],
    };
    let outcome = outcomes::outcome_for_decision(&state.pool, id).await?;

    Ok(Json(DecisionDetail {
        decision,
        entries,
        outcome,
    }))
}

/// POST /api/v1/decisions/{id}/outcome
///
/// Append-only: a second report for the same decision is a 409.
pub async fn record_outcome(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RecordOutcomeInput>,
) -> AppResult<(StatusCode, Json<Outcome>)> {
    let outcome = outcomes::record_outcome(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
