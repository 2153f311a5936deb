//! Health guard: circuit breakers plus the last-known-good cache.
//!
//! All state lives in PostgreSQL so every engine instance shares one view.
//! Expiry is lazy: reads only consider rows that are still holding, and
//! the janitor task purges the rest.

use std::collections::HashSet;

use sqlx::PgPool;

use modelpick_core::types::DbId;
use modelpick_db::models::guard::{
    CircuitBreaker, CloseBreakerInput, LkgEntry, ReportFailureInput, PROVIDER_WIDE_CANDIDATE_ID,
};
use modelpick_db::repositories::{BreakerRepo, LkgRepo};

use crate::config::EngineConfig;
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// BreakerSet
// ---------------------------------------------------------------------------

/// Every open breaker folded into one pool filter.
///
/// Loaded once per rank request so the pool scan never goes back to the
/// database per candidate.
#[derive(Debug, Default)]
pub struct BreakerSet {
    providers: HashSet<String>,
    candidates: HashSet<DbId>,
}

impl BreakerSet {
    pub fn from_rows(rows: Vec<CircuitBreaker>) -> Self {
        let mut set = Self::default();
        for row in rows {
            if row.is_provider_wide() {
                set.providers.insert(row.provider);
            } else {
                set.candidates.insert(row.candidate_id);
            }
        }
        set
    }

    /// Whether either the provider-wide or the candidate breaker holds.
    pub fn blocks(&self, provider: &str, candidate_id: DbId) -> bool {
        self.providers.contains(provider) || self.candidates.contains(&candidate_id)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty() && self.candidates.is_empty()
    }
}

// ---------------------------------------------------------------------------
// HealthGuard
// ---------------------------------------------------------------------------

/// Shared facade over breaker and LKG state.
#[derive(Clone)]
pub struct HealthGuard {
    pool: PgPool,
    config: EngineConfig,
}

impl HealthGuard {
    pub fn new(pool: PgPool, config: EngineConfig) -> Self {
        Self { pool, config }
    }

    /// Open (or re-open) a breaker from an external failure report.
    ///
    /// Severe failures hold for the longer tier. A repeated report restarts
    /// the break window.
    pub async fn report_failure(
        &self,
        input: &ReportFailureInput,
    ) -> Result<CircuitBreaker, EngineError> {
        input.validate()?;
        let break_until = self.config.break_until(input.severe);
        let reason = input.reason.as_deref().unwrap_or("unspecified");
        let breaker = BreakerRepo::open(
            &self.pool,
            &input.provider,
            input.candidate_id,
            break_until,
            reason,
            input.severe,
        )
        .await?;
        tracing::warn!(
            provider = %breaker.provider,
            candidate_id = breaker.candidate_id,
            severe = breaker.severe,
            break_until = %breaker.break_until,
            "Circuit breaker opened"
        );
        Ok(breaker)
    }

    /// Close a breaker early. Returns whether one was open.
    pub async fn close_breaker(&self, input: &CloseBreakerInput) -> Result<bool, EngineError> {
        input.validate()?;
        let closed = BreakerRepo::close(&self.pool, &input.provider, input.candidate_id).await?;
        if closed {
            tracing::info!(
                provider = %input.provider,
                candidate_id = input.candidate_id.unwrap_or(PROVIDER_WIDE_CANDIDATE_ID),
                "Circuit breaker closed"
            );
        }
        Ok(closed)
    }

    /// Whether the provider or this specific candidate is currently broken.
    pub async fn is_open(&self, provider: &str, candidate_id: DbId) -> Result<bool, EngineError> {
        let blocking = BreakerRepo::find_blocking(&self.pool, provider, candidate_id).await?;
        Ok(blocking.is_some())
    }

    /// All breakers that are still holding.
    pub async fn list_open(&self) -> Result<Vec<CircuitBreaker>, EngineError> {
        Ok(BreakerRepo::list_open(&self.pool).await?)
    }

    /// Snapshot of every open breaker for one pool scan.
    pub async fn load_open(&self) -> Result<BreakerSet, EngineError> {
        let rows = BreakerRepo::list_open(&self.pool).await?;
        Ok(BreakerSet::from_rows(rows))
    }

    /// The segment's last-known-good pick, if still valid.
    pub async fn lkg_get(&self, segment_key: &str) -> Result<Option<LkgEntry>, EngineError> {
        Ok(LkgRepo::get_valid(&self.pool, segment_key).await?)
    }

    /// Record a healthy pick for the segment, restarting the TTL.
    pub async fn lkg_record(
        &self,
        segment_key: &str,
        candidate_id: DbId,
    ) -> Result<LkgEntry, EngineError> {
        let expires_at = self.config.lkg_expires_at();
        Ok(LkgRepo::record(&self.pool, segment_key, candidate_id, expires_at).await?)
    }

    /// All valid LKG entries.
    pub async fn lkg_list(&self) -> Result<Vec<LkgEntry>, EngineError> {
        Ok(LkgRepo::list_valid(&self.pool).await?)
    }

    /// Purge expired breaker and LKG rows. Returns `(breakers, lkg)` counts.
    pub async fn purge_expired(&self) -> Result<(u64, u64), EngineError> {
        let breakers = BreakerRepo::purge_expired(&self.pool).await?;
        let lkg = LkgRepo::purge_expired(&self.pool).await?;
        Ok((breakers, lkg))
    }
}
