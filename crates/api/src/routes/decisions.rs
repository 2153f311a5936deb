//! Route definitions for the decision log, mounted at `/decisions`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::decisions;
use crate::state::AppState;

/// ```text
/// GET  /               -> list
/// GET  /{id}           -> get_by_id
/// POST /{id}/outcome   -> record_outcome
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(decisions::list))
        .route("/{id}", get(decisions::get_by_id))
        .route("/{id}/outcome", post(decisions::record_outcome))
}
