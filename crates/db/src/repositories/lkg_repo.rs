//! Repository for the `lkg_entries` table (last-known-good picks).

use sqlx::PgPool;

use modelpick_core::types::{DbId, Timestamp};

use crate::models::guard::LkgEntry;

/// Column list for `lkg_entries` SELECT queries.
const COLUMNS: &str = "segment_key, candidate_id, decided_at, expires_at";

/// Provides query operations for last-known-good picks.
pub struct LkgRepo;

impl LkgRepo {
    /// The segment's entry if it has not expired.
    pub async fn get_valid(
        pool: &PgPool,
        segment_key: &str,
    ) -> Result<Option<LkgEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lkg_entries \
             WHERE segment_key = $1 AND expires_at > NOW()"
        );
        sqlx::query_as::<_, LkgEntry>(&query)
            .bind(segment_key)
            .fetch_optional(pool)
            .await
    }

    /// Record a pick for the segment, replacing any previous entry and
    /// restarting the TTL.
    pub async fn record(
        pool: &PgPool,
        segment_key: &str,
        candidate_id: DbId,
        expires_at: Timestamp,
    ) -> Result<LkgEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO lkg_entries (segment_key, candidate_id, decided_at, expires_at) \
             VALUES ($1, $2, NOW(), $3) \
             ON CONFLICT (segment_key) DO UPDATE SET \
                candidate_id = EXCLUDED.candidate_id, \
                decided_at = NOW(), \
                expires_at = EXCLUDED.expires_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LkgEntry>(&query)
            .bind(segment_key)
            .bind(candidate_id)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Every entry that is still valid.
    pub async fn list_valid(pool: &PgPool) -> Result<Vec<LkgEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lkg_entries \
             WHERE expires_at > NOW() ORDER BY segment_key"
        );
        sqlx::query_as::<_, LkgEntry>(&query).fetch_all(pool).await
    }

    /// Delete expired rows. Returns the number removed.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lkg_entries WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
