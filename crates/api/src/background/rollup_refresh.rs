//! Periodic segment-rollup refresh.
//!
//! Rewrites `segment_rollups` from decisions joined to outcomes over the
//! trailing window, refreshes the candidates' quality/stability snapshots,
//! then runs the adaptive epsilon sweep against the fresh rollups. The
//! fine ranker only ever reads these precomputed rows, never raw outcomes.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use modelpick_db::repositories::{CandidateRepo, SegmentRollupRepo};
use modelpick_engine::{epsilon, EngineConfig};

/// How often the rollup window is recomputed.
const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Run the rollup refresh loop until `cancel` is triggered.
pub async fn run(pool: PgPool, config: EngineConfig, cancel: CancellationToken) {
    let interval_secs: u64 = std::env::var("ROLLUP_REFRESH_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(REFRESH_INTERVAL.as_secs());

    tracing::info!(
        interval_secs,
        window_hours = config.rollup_window_hours,
        "Rollup refresh job started"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rollup refresh job stopping");
                break;
            }
            _ = interval.tick() => {
                refresh_once(&pool, &config).await;
            }
        }
    }
}

/// One refresh pass. Errors are logged and swallowed; the next tick retries.
async fn refresh_once(pool: &PgPool, config: &EngineConfig) {
    let window_start = config.window_start();

    match SegmentRollupRepo::refresh(pool, window_start).await {
        Ok(rows) => {
            tracing::debug!(rows, "Segment rollups refreshed");
        }
        Err(e) => {
            tracing::error!(error = %e, "Segment rollup refresh failed");
            return;
        }
    }

    match CandidateRepo::refresh_snapshots(pool, window_start).await {
        Ok(updated) => {
            if updated > 0 {
                tracing::debug!(updated, "Candidate snapshots refreshed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Candidate snapshot refresh failed");
        }
    }

    // The sweep is idempotent per refresh stamp, so running it every tick
    // adapts each segment at most once per rewrite.
    match epsilon::adapt_sweep(pool, config).await {
        Ok(adapted) => {
            if adapted > 0 {
                tracing::info!(adapted, "Exploration rates adapted");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Epsilon adaptation failed");
        }
    }
}
