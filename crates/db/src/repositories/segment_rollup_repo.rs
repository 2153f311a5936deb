//! Repository for the `segment_rollups` materialization.
//!
//! The refresh rewrites the whole table from the outcome log inside one
//! transaction; readers only ever see a complete window. With a trailing 24h
//! window the table stays small (segments x candidates), so the rewrite is
//! cheap at the refresh cadence.

use sqlx::PgPool;

use modelpick_core::types::{DbId, Timestamp};

use crate::models::segment_rollup::{SegmentRollup, SEGMENT_WIDE_CANDIDATE_ID};

/// Column list for `segment_rollups` SELECT queries.
const COLUMNS: &str = "\
    segment_key, candidate_id, mean_quality, mean_edit_ratio, rejection_rate, \
    mean_cost, mean_latency_ms, sample_count, window_start, refreshed_at";

const AGGREGATES: &str = "\
    AVG(o.quality_score) AS mean_quality, \
    AVG(o.edit_ratio) AS mean_edit_ratio, \
    AVG(CASE WHEN o.rejected THEN 1.0 ELSE 0.0 END) AS rejection_rate, \
    AVG(o.cost_actual) AS mean_cost, \
    AVG(o.latency_ms) AS mean_latency_ms, \
    COUNT(*) AS sample_count";

/// Provides query operations for rolling segment metrics.
pub struct SegmentRollupRepo;

impl SegmentRollupRepo {
    /// Rewrite the materialization from outcomes at or after `window_start`.
    ///
    /// Produces one row per (segment, chosen candidate) plus a segment-wide
    /// row under [`SEGMENT_WIDE_CANDIDATE_ID`]. Returns the number of rows
    /// materialized. Concurrent refreshes are last-write-wins.
    pub async fn refresh(pool: &PgPool, window_start: Timestamp) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM segment_rollups")
            .execute(&mut *tx)
            .await?;

        let per_candidate = sqlx::query(&format!(
            "INSERT INTO segment_rollups \
                (segment_key, candidate_id, mean_quality, mean_edit_ratio, \
                 rejection_rate, mean_cost, mean_latency_ms, sample_count, \
                 window_start, refreshed_at) \
             SELECT d.segment_key, d.chosen_candidate_id, {AGGREGATES}, $1, NOW() \
             FROM outcomes o \
             JOIN decisions d ON d.id = o.decision_id \
             WHERE o.created_at >= $1 \
             GROUP BY d.segment_key, d.chosen_candidate_id"
        ))
        .bind(window_start)
        .execute(&mut *tx)
        .await?;

        let segment_wide = sqlx::query(&format!(
            "INSERT INTO segment_rollups \
                (segment_key, candidate_id, mean_quality, mean_edit_ratio, \
                 rejection_rate, mean_cost, mean_latency_ms, sample_count, \
                 window_start, refreshed_at) \
             SELECT d.segment_key, {SEGMENT_WIDE_CANDIDATE_ID}, {AGGREGATES}, $1, NOW() \
             FROM outcomes o \
             JOIN decisions d ON d.id = o.decision_id \
             WHERE o.created_at >= $1 \
             GROUP BY d.segment_key"
        ))
        .bind(window_start)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(per_candidate.rows_affected() + segment_wide.rows_affected())
    }

    pub async fn find(
        pool: &PgPool,
        segment_key: &str,
        candidate_id: DbId,
    ) -> Result<Option<SegmentRollup>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM segment_rollups \
             WHERE segment_key = $1 AND candidate_id = $2"
        );
        sqlx::query_as::<_, SegmentRollup>(&query)
            .bind(segment_key)
            .bind(candidate_id)
            .fetch_optional(pool)
            .await
    }

    /// The segment-wide aggregate row, if the segment saw any outcomes.
    pub async fn segment_wide(
        pool: &PgPool,
        segment_key: &str,
    ) -> Result<Option<SegmentRollup>, sqlx::Error> {
        Self::find(pool, segment_key, SEGMENT_WIDE_CANDIDATE_ID).await
    }

    /// All rollup rows for a segment, segment-wide row first.
    pub async fn list_for_segment(
        pool: &PgPool,
        segment_key: &str,
    ) -> Result<Vec<SegmentRollup>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM segment_rollups \
             WHERE segment_key = $1 ORDER BY candidate_id"
        );
        sqlx::query_as::<_, SegmentRollup>(&query)
            .bind(segment_key)
            .fetch_all(pool)
            .await
    }
}
