//! Hourly cleanup of expired guard state.
//!
//! Reads already ignore expired breaker and LKG rows (lazy expiry); this
//! job just keeps the tables from accumulating dead rows.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use modelpick_engine::HealthGuard;

/// How often expired rows are purged.
const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the guard janitor loop until `cancel` is triggered.
pub async fn run(guard: HealthGuard, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = PURGE_INTERVAL.as_secs(),
        "Guard janitor started"
    );

    let mut interval = tokio::time::interval(PURGE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Guard janitor stopping");
                break;
            }
            _ = interval.tick() => {
                match guard.purge_expired().await {
                    Ok((breakers, lkg)) => {
                        if breakers > 0 || lkg > 0 {
                            tracing::info!(breakers, lkg, "Guard janitor: purged expired rows");
                        } else {
                            tracing::debug!("Guard janitor: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Guard janitor: purge failed");
                    }
                }
            }
        }
    }
}
