//! Repository for the append-only `outcomes` table.

use sqlx::PgPool;

use modelpick_core::types::DbId;

use crate::models::outcome::{Outcome, RecordOutcomeInput};

/// Column list for `outcomes` SELECT queries.
const COLUMNS: &str = "\
    id, decision_id, quality_score, edit_ratio, latency_ms, cost_actual, \
    rejected, created_at";

/// Provides query operations for recorded outcomes.
pub struct OutcomeRepo;

impl OutcomeRepo {
    /// Insert the outcome for a decision.
    ///
    /// The unique index on `decision_id` makes a second insert fail with a
    /// unique violation; callers map that to a conflict.
    pub async fn insert(
        pool: &PgPool,
        decision_id: DbId,
        input: &RecordOutcomeInput,
    ) -> Result<Outcome, sqlx::Error> {
        let query = format!(
            "INSERT INTO outcomes \
                (decision_id, quality_score, edit_ratio, latency_ms, cost_actual, rejected) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Outcome>(&query)
            .bind(decision_id)
            .bind(input.quality_score)
            .bind(input.edit_ratio)
            .bind(input.latency_ms)
            .bind(input.cost_actual)
            .bind(input.rejected)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_decision(
        pool: &PgPool,
        decision_id: DbId,
    ) -> Result<Option<Outcome>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM outcomes WHERE decision_id = $1");
        sqlx::query_as::<_, Outcome>(&query)
            .bind(decision_id)
            .fetch_optional(pool)
            .await
    }
}
