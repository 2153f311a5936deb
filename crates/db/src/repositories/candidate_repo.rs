//! Repository for the `candidates` table.

use sqlx::PgPool;

use modelpick_core::types::{DbId, Timestamp};

use crate::models::candidate::{Candidate, CandidateStatus, UpsertCandidateInput};

/// Column list for `candidates` SELECT queries.
const COLUMNS: &str = "\
    id, provider, name, version, status, languages, capabilities, \
    context_window, max_output_tokens, unit_price_per_1k, \
    quality_score, stability_score, tags, created_at, updated_at";

/// Provides query operations for the candidate registry.
pub struct CandidateRepo;

impl CandidateRepo {
    /// Insert or update a candidate keyed by (provider, name, version).
    ///
    /// Updates replace the registry fields but keep the rolling
    /// quality/stability snapshot unless the input seeds one explicitly.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertCandidateInput,
    ) -> Result<Candidate, sqlx::Error> {
        let query = format!(
            "INSERT INTO candidates \
                (provider, name, version, languages, capabilities, \
                 context_window, max_output_tokens, unit_price_per_1k, \
                 quality_score, stability_score, tags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (provider, name, version) DO UPDATE SET \
                languages = EXCLUDED.languages, \
                capabilities = EXCLUDED.capabilities, \
                context_window = EXCLUDED.context_window, \
                max_output_tokens = EXCLUDED.max_output_tokens, \
                unit_price_per_1k = EXCLUDED.unit_price_per_1k, \
                quality_score = COALESCE(EXCLUDED.quality_score, candidates.quality_score), \
                stability_score = COALESCE(EXCLUDED.stability_score, candidates.stability_score), \
                tags = EXCLUDED.tags, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Candidate>(&query)
            .bind(&input.provider)
            .bind(&input.name)
            .bind(&input.version)
            .bind(&input.languages)
            .bind(input.capabilities.to_value())
            .bind(input.context_window)
            .bind(input.max_output_tokens)
            .bind(input.unit_price_per_1k)
            .bind(input.quality_score)
            .bind(input.stability_score)
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Candidate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM candidates WHERE id = $1");
        sqlx::query_as::<_, Candidate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every active candidate, in insertion order. This is the ranking pool.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Candidate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM candidates WHERE status = 'active' ORDER BY id"
        );
        sqlx::query_as::<_, Candidate>(&query).fetch_all(pool).await
    }

    /// List candidates with an optional status filter.
    pub async fn list(
        pool: &PgPool,
        status: Option<CandidateStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Candidate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM candidates \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY provider, name, version \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Candidate>(&query)
            .bind(status.map(CandidateStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Set the lifecycle status, returning the updated row if it exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: CandidateStatus,
    ) -> Result<Option<Candidate>, sqlx::Error> {
        let query = format!(
            "UPDATE candidates SET status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Candidate>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Refresh the rolling quality/stability snapshots from outcomes inside
    /// the window. Stability is one minus the rejection rate. Candidates
    /// without samples keep their previous snapshot.
    pub async fn refresh_snapshots(
        pool: &PgPool,
        window_start: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE candidates c SET \
                quality_score = COALESCE(s.mean_quality, c.quality_score), \
                stability_score = 1.0 - s.rejection_rate, \
                updated_at = NOW() \
             FROM ( \
                SELECT d.chosen_candidate_id AS candidate_id, \
                       AVG(o.quality_score) AS mean_quality, \
                       AVG(CASE WHEN o.rejected THEN 1.0 ELSE 0.0 END) AS rejection_rate \
                FROM outcomes o \
                JOIN decisions d ON d.id = o.decision_id \
                WHERE o.created_at >= $1 \
                GROUP BY d.chosen_candidate_id \
             ) s \
             WHERE c.id = s.candidate_id",
        )
        .bind(window_start)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
