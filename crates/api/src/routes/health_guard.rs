//! Route definitions for the health guard, mounted at `/health-guard`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::health_guard;
use crate::state::AppState;

/// ```text
/// GET  /         -> view (open breakers + LKG entries)
/// POST /report   -> report
/// POST /close    -> close
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_guard::view))
        .route("/report", post(health_guard::report))
        .route("/close", post(health_guard::close))
}
