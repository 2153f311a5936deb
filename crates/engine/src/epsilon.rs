//! Per-segment exploration rates.
//!
//! The hot path only reads here. The adaptive sweep runs as a background
//! task after each rollup refresh and is idempotent per refresh stamp, so
//! any number of engine instances can fire it.

use sqlx::PgPool;

use modelpick_core::explore::{
    clamp_epsilon, ADAPT_HIGH_QUALITY, ADAPT_LOW_QUALITY, ADAPT_STEP, EPSILON_MAX, EPSILON_MIN,
};
use modelpick_db::repositories::epsilon_repo::EpsilonAdaptParams;
use modelpick_db::repositories::EpsilonRepo;

use crate::config::EngineConfig;

/// Effective epsilon for a segment: the adaptive state when present,
/// otherwise the configured default. Always clamped.
pub async fn epsilon_for_segment(
    pool: &PgPool,
    segment_key: &str,
    default_epsilon: f64,
) -> Result<f64, sqlx::Error> {
    let state = EpsilonRepo::get(pool, segment_key).await?;
    let epsilon = state.map(|s| s.epsilon).unwrap_or(default_epsilon);
    Ok(clamp_epsilon(epsilon))
}

/// Sweep parameters from the policy constant table.
pub fn adapt_params(config: &EngineConfig) -> EpsilonAdaptParams {
    EpsilonAdaptParams {
        low_quality: ADAPT_LOW_QUALITY,
        high_quality: ADAPT_HIGH_QUALITY,
        step: ADAPT_STEP,
        eps_min: EPSILON_MIN,
        eps_max: EPSILON_MAX,
        eps_default: clamp_epsilon(config.epsilon_default),
    }
}

/// One adaptive sweep over every segment with fresh rollup data.
/// Returns the number of segment states touched.
pub async fn adapt_sweep(pool: &PgPool, config: &EngineConfig) -> Result<u64, sqlx::Error> {
    EpsilonRepo::adapt_all(pool, &adapt_params(config)).await
}
