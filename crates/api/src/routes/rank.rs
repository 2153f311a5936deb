//! Route definition for the ranking endpoint, mounted at `/rank`.

use axum::routing::post;
use axum::Router;

use crate::handlers::rank;
use crate::state::AppState;

/// ```text
/// POST / -> rank
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(rank::rank))
}
