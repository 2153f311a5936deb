//! Handler for per-segment metric reads.

use axum::extract::{Path, State};
use axum::Json;

use modelpick_db::models::segment_rollup::SegmentRollup;
use modelpick_db::repositories::SegmentRollupRepo;

use crate::error::AppResult;
use crate::response::ListResponse;
use crate::state::AppState;

/// GET /api/v1/segments/{segment_key}/metrics
///
/// Rows from the current rollup window; candidate_id 0 is the segment-wide
/// aggregate. An unknown segment returns an empty list, not a 404.
pub async fn metrics(
    State(state): State<AppState>,
    Path(segment_key): Path<String>,
) -> AppResult<Json<ListResponse<SegmentRollup>>> {
    let rollups = SegmentRollupRepo::list_for_segment(&state.pool, &segment_key).await?;
    Ok(Json(ListResponse { data: rollups }))
}
