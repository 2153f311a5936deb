//! Route definitions for the candidate registry, mounted at `/candidates`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::candidates;
use crate::state::AppState;

/// ```text
/// GET  /                  -> list
/// POST /                  -> upsert
/// GET  /{id}              -> get_by_id
/// POST /{id}/deactivate   -> deactivate
/// POST /{id}/reactivate   -> reactivate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(candidates::list).post(candidates::upsert))
        .route("/{id}", get(candidates::get_by_id))
        .route("/{id}/deactivate", post(candidates::deactivate))
        .route("/{id}/reactivate", post(candidates::reactivate))
}
