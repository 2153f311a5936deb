//! Health guard entities: circuit breakers and last-known-good picks.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use modelpick_core::error::CoreError;
use modelpick_core::types::{DbId, Timestamp};
use modelpick_core::validation::validate_non_empty;

/// `candidate_id` of a provider-wide breaker row.
pub const PROVIDER_WIDE_CANDIDATE_ID: DbId = 0;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// An open circuit: the provider (or one candidate of it) is excluded from
/// every pool until `break_until`. Expired rows are ignored on read and
/// purged lazily.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CircuitBreaker {
    pub provider: String,
    pub candidate_id: DbId,
    pub break_until: Timestamp,
    pub reason: String,
    pub severe: bool,
    pub opened_at: Timestamp,
}

impl CircuitBreaker {
    pub fn is_provider_wide(&self) -> bool {
        self.candidate_id == PROVIDER_WIDE_CANDIDATE_ID
    }
}

/// Last healthy pick for a segment, with its own TTL.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LkgEntry {
    pub segment_key: String,
    pub candidate_id: DbId,
    pub decided_at: Timestamp,
    pub expires_at: Timestamp,
}

/// Per-segment exploration rate with the refresh stamp it last adapted to.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EpsilonState {
    pub segment_key: String,
    pub epsilon: f64,
    pub adapted_for: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for reporting a failure and opening a breaker.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportFailureInput {
    pub provider: String,
    /// Break a single candidate; omit to break the whole provider.
    #[serde(default)]
    pub candidate_id: Option<DbId>,
    #[serde(default)]
    pub reason: Option<String>,
    /// Severe failures (auth revoked, provider outage) hold longer.
    #[serde(default)]
    pub severe: bool,
}

impl ReportFailureInput {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_non_empty(&self.provider, "provider")?;
        if let Some(candidate_id) = self.candidate_id {
            if candidate_id <= 0 {
                return Err(CoreError::validation("candidate_id must be positive"));
            }
        }
        Ok(())
    }
}

/// DTO for closing a breaker early.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseBreakerInput {
    pub provider: String,
    #[serde(default)]
    pub candidate_id: Option<DbId>,
}

impl CloseBreakerInput {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_non_empty(&self.provider, "provider")?;
        Ok(())
    }
}
