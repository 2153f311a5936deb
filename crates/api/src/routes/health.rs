//! Root-level liveness probe.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct Health {
    /// `"ok"`, or `"degraded"` when the database does not answer.
    status: &'static str,
    version: &'static str,
    db_healthy: bool,
}

/// GET /health. Always 200; a dead database flips the payload to
/// degraded instead of failing the probe.
async fn probe(State(state): State<AppState>) -> Json<Health> {
    let db_healthy = modelpick_db::health_check(&state.pool).await.is_ok();

    Json(Health {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(probe))
}
