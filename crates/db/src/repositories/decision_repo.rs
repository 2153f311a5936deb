//! Repository for `candidate_sets` and `decisions`.
//!
//! The snapshot and the decision row are written in one transaction so a
//! decision can never exist without the set it was made against.

use sqlx::PgPool;

use modelpick_core::types::DbId;

use crate::models::decision::{CandidateSet, Decision, DecisionListQuery, NewDecision};

/// Column list for `decisions` SELECT queries.
const COLUMNS: &str = "\
    id, request_id, candidate_set_id, chosen_candidate_id, segment_key, \
    strategy_version, weights_version, explored, fallback_used, \
    coarse_score, fine_score, expected_cost, expected_latency_ms, created_at";

const SET_COLUMNS: &str = "\
    id, segment_key, task, context, constraints, entries, created_at";

/// Default page size for decision listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Hard page size cap.
pub const MAX_LIST_LIMIT: i64 = 500;

/// Provides query operations for the decision log.
pub struct DecisionRepo;

impl DecisionRepo {
    /// Persist a snapshot and its decision atomically.
    ///
    /// Returns `Ok(None)` when another decision already holds the same
    /// `request_id`; the whole transaction rolls back and the caller replays
    /// the stored decision instead.
    pub async fn create_with_snapshot(
        pool: &PgPool,
        new: &NewDecision,
    ) -> Result<Option<Decision>, sqlx::Error> {
        let entries = serde_json::json!(new.entries);
        let mut tx = pool.begin().await?;

        let set_id: DbId = sqlx::query_scalar(
            "INSERT INTO candidate_sets (segment_key, task, context, constraints, entries) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&new.segment_key)
        .bind(&new.task)
        .bind(&new.context)
        .bind(&new.constraints)
        .bind(&entries)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO decisions \
                (request_id, candidate_set_id, chosen_candidate_id, segment_key, \
                 strategy_version, weights_version, explored, fallback_used, \
                 coarse_score, fine_score, expected_cost, expected_latency_ms) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (request_id) WHERE request_id IS NOT NULL DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let decision = sqlx::query_as::<_, Decision>(&query)
            .bind(&new.request_id)
            .bind(set_id)
            .bind(new.chosen_candidate_id)
            .bind(&new.segment_key)
            .bind(new.strategy_version)
            .bind(new.weights_version)
            .bind(new.explored)
            .bind(new.fallback_used)
            .bind(new.coarse_score)
            .bind(new.fine_score)
            .bind(new.expected_cost)
            .bind(new.expected_latency_ms)
            .fetch_optional(&mut *tx)
            .await?;

        match decision {
            Some(decision) => {
                tx.commit().await?;
                Ok(Some(decision))
            }
            None => {
                // Duplicate request_id; discard the orphan snapshot too.
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Decision>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decisions WHERE id = $1");
        sqlx::query_as::<_, Decision>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_request_id(
        pool: &PgPool,
        request_id: &str,
    ) -> Result<Option<Decision>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decisions WHERE request_id = $1");
        sqlx::query_as::<_, Decision>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_set(
        pool: &PgPool,
        set_id: DbId,
    ) -> Result<Option<CandidateSet>, sqlx::Error> {
        let query = format!("SELECT {SET_COLUMNS} FROM candidate_sets WHERE id = $1");
        sqlx::query_as::<_, CandidateSet>(&query)
            .bind(set_id)
            .fetch_optional(pool)
            .await
    }

    /// List decisions, newest first, with optional segment/candidate filters.
    pub async fn list(
        pool: &PgPool,
        params: &DecisionListQuery,
    ) -> Result<Vec<Decision>, sqlx::Error> {
        let limit = params
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);
        let query = format!(
            "SELECT {COLUMNS} FROM decisions \
             WHERE ($1::TEXT IS NULL OR segment_key = $1) \
               AND ($2::BIGINT IS NULL OR chosen_candidate_id = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Decision>(&query)
            .bind(&params.segment_key)
            .bind(params.candidate_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
