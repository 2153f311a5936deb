//! Repository for per-segment exploration rates.
//!
//! The adaptive step is expressed in SQL against the segment-wide rollup
//! rows. Each state row remembers the rollup refresh stamp it adapted to
//! (`adapted_for`), so running the step twice against the same refresh is a
//! no-op no matter how many engine instances fire it.

use sqlx::PgPool;

use crate::models::guard::EpsilonState;
use crate::models::segment_rollup::SEGMENT_WIDE_CANDIDATE_ID;

/// Column list for `epsilon_states` SELECT queries.
const COLUMNS: &str = "segment_key, epsilon, adapted_for, updated_at";

/// Policy parameters for one adaptive sweep.
#[derive(Debug, Clone, Copy)]
pub struct EpsilonAdaptParams {
    /// Mean quality below which epsilon widens.
    pub low_quality: f64,
    /// Mean quality above which epsilon narrows.
    pub high_quality: f64,
    /// Relative step (0.10 widens/narrows by 10%).
    pub step: f64,
    pub eps_min: f64,
    pub eps_max: f64,
    /// Starting epsilon for a segment without state.
    pub eps_default: f64,
}

/// Provides query operations for exploration state.
pub struct EpsilonRepo;

impl EpsilonRepo {
    pub async fn get(
        pool: &PgPool,
        segment_key: &str,
    ) -> Result<Option<EpsilonState>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM epsilon_states WHERE segment_key = $1");
        sqlx::query_as::<_, EpsilonState>(&query)
            .bind(segment_key)
            .fetch_optional(pool)
            .await
    }

    /// One adaptive sweep over every segment with fresh rollup data.
    ///
    /// Existing states multiply their epsilon by the step, new segments start
    /// from the default; both branches clamp into `[eps_min, eps_max]` and
    /// stamp `adapted_for` with the rollup's `refreshed_at`. Returns the
    /// number of states touched.
    pub async fn adapt_all(
        pool: &PgPool,
        params: &EpsilonAdaptParams,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(&format!(
            "UPDATE epsilon_states e SET \
                epsilon = LEAST($5, GREATEST($4, \
                    CASE WHEN r.mean_quality < $1 THEN e.epsilon * (1.0 + $3) \
                         WHEN r.mean_quality > $2 THEN e.epsilon * (1.0 - $3) \
                         ELSE e.epsilon END)), \
                adapted_for = r.refreshed_at, \
                updated_at = NOW() \
             FROM segment_rollups r \
             WHERE r.segment_key = e.segment_key \
               AND r.candidate_id = {SEGMENT_WIDE_CANDIDATE_ID} \
               AND r.mean_quality IS NOT NULL \
               AND e.adapted_for < r.refreshed_at"
        ))
        .bind(params.low_quality)
        .bind(params.high_quality)
        .bind(params.step)
        .bind(params.eps_min)
        .bind(params.eps_max)
        .execute(&mut *tx)
        .await?;

        let inserted = sqlx::query(&format!(
            "INSERT INTO epsilon_states (segment_key, epsilon, adapted_for, updated_at) \
             SELECT r.segment_key, \
                    LEAST($5, GREATEST($4, \
                        CASE WHEN r.mean_quality < $1 THEN $6 * (1.0 + $3) \
                             WHEN r.mean_quality > $2 THEN $6 * (1.0 - $3) \
                             ELSE $6 END)), \
                    r.refreshed_at, NOW() \
             FROM segment_rollups r \
             WHERE r.candidate_id = {SEGMENT_WIDE_CANDIDATE_ID} \
               AND r.mean_quality IS NOT NULL \
             ON CONFLICT (segment_key) DO NOTHING"
        ))
        .bind(params.low_quality)
        .bind(params.high_quality)
        .bind(params.step)
        .bind(params.eps_min)
        .bind(params.eps_max)
        .bind(params.eps_default)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated.rows_affected() + inserted.rows_affected())
    }
}
