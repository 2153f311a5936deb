//! Handler for the ranking endpoint.

use axum::extract::State;
use axum::Json;

use modelpick_engine::{RankRequest, RankResponse};

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/rank
///
/// Runs the full two-stage ranking flow and answers with the persisted
/// decision. Validation problems map to 400, an empty pool without a
/// usable fallback maps to 503.
pub async fn rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> AppResult<Json<RankResponse>> {
    let response = state.orchestrator.rank(request).await?;
    Ok(Json(response))
}
