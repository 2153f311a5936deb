//! Repository for the `circuit_breakers` table.
//!
//! Expiry is lazy: reads filter on `break_until > NOW()` and a janitor task
//! deletes stale rows. A provider-wide break is stored under candidate_id 0.

use sqlx::PgPool;

use modelpick_core::types::{DbId, Timestamp};

use crate::models::guard::{CircuitBreaker, PROVIDER_WIDE_CANDIDATE_ID};

/// Column list for `circuit_breakers` SELECT queries.
const COLUMNS: &str = "\
    provider, candidate_id, break_until, reason, severe, opened_at";

/// Provides query operations for circuit breakers.
pub struct BreakerRepo;

impl BreakerRepo {
    /// Open (or re-open) a breaker. A repeated report overwrites the row,
    /// restarting the break window with the new duration and reason.
    pub async fn open(
        pool: &PgPool,
        provider: &str,
        candidate_id: Option<DbId>,
        break_until: Timestamp,
        reason: &str,
        severe: bool,
    ) -> Result<CircuitBreaker, sqlx::Error> {
        let query = format!(
            "INSERT INTO circuit_breakers \
                (provider, candidate_id, break_until, reason, severe, opened_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             ON CONFLICT (provider, candidate_id) DO UPDATE SET \
                break_until = EXCLUDED.break_until, \
                reason = EXCLUDED.reason, \
                severe = EXCLUDED.severe, \
                opened_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CircuitBreaker>(&query)
            .bind(provider)
            .bind(candidate_id.unwrap_or(PROVIDER_WIDE_CANDIDATE_ID))
            .bind(break_until)
            .bind(reason)
            .bind(severe)
            .fetch_one(pool)
            .await
    }

    /// Close a breaker early. Returns whether a row was deleted.
    pub async fn close(
        pool: &PgPool,
        provider: &str,
        candidate_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM circuit_breakers WHERE provider = $1 AND candidate_id = $2",
        )
        .bind(provider)
        .bind(candidate_id.unwrap_or(PROVIDER_WIDE_CANDIDATE_ID))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every breaker that is still holding.
    pub async fn list_open(pool: &PgPool) -> Result<Vec<CircuitBreaker>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM circuit_breakers \
             WHERE break_until > NOW() ORDER BY provider, candidate_id"
        );
        sqlx::query_as::<_, CircuitBreaker>(&query)
            .fetch_all(pool)
            .await
    }

    /// The open breaker blocking a candidate, considering both the
    /// candidate-scoped and the provider-wide row.
    pub async fn find_blocking(
        pool: &PgPool,
        provider: &str,
        candidate_id: DbId,
    ) -> Result<Option<CircuitBreaker>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM circuit_breakers \
             WHERE provider = $1 AND candidate_id IN ($2, $3) AND break_until > NOW() \
             ORDER BY candidate_id LIMIT 1"
        );
        sqlx::query_as::<_, CircuitBreaker>(&query)
            .bind(provider)
            .bind(PROVIDER_WIDE_CANDIDATE_ID)
            .bind(candidate_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete expired rows. Returns the number removed.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM circuit_breakers WHERE break_until <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
