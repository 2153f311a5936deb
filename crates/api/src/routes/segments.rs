//! Route definitions for segment metrics, mounted at `/segments`.

use axum::routing::get;
use axum::Router;

use crate::handlers::segments;
use crate::state::AppState;

/// ```text
/// GET /{segment_key}/metrics -> metrics
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{segment_key}/metrics", get(segments::metrics))
}
