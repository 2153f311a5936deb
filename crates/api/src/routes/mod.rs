pub mod candidates;
pub mod decisions;
pub mod health;
pub mod health_guard;
pub mod rank;
pub mod segments;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /rank                                POST  run the ranking flow
///
/// /decisions                           GET   list (?segment_key, ?candidate_id, paging)
/// /decisions/{id}                      GET   decision + frozen candidate set + outcome
/// /decisions/{id}/outcome              POST  record outcome (201, 409 on repeat)
///
/// /candidates                          GET, POST (upsert registry entry)
/// /candidates/{id}                     GET
/// /candidates/{id}/deactivate          POST
/// /candidates/{id}/reactivate          POST
///
/// /health-guard                        GET   open breakers + LKG entries
/// /health-guard/report                 POST  report provider/candidate failure
/// /health-guard/close                  POST  close a breaker early
///
/// /segments/{segment_key}/metrics      GET   rollup rows for the segment
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // The ranking flow itself.
        .nest("/rank", rank::router())
        // Decision audit log and outcome intake.
        .nest("/decisions", decisions::router())
        // Candidate registry administration.
        .nest("/candidates", candidates::router())
        // Failure reports, breaker state, LKG view.
        .nest("/health-guard", health_guard::router())
        // Segment metric reads.
        .nest("/segments", segments::router())
}
