//! Engine error type.
//!
//! The HTTP layer maps these onto status codes; the engine itself never
//! retries. Provider and candidate failures are not errors here at all:
//! they arrive through the health-guard report path and shrink future
//! pools instead.

use modelpick_core::error::CoreError;
use modelpick_core::types::DbId;

/// Errors a rank or outcome request can surface.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The request failed validation. Never retried.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Filtering and the LKG fallback both came up empty.
    #[error("No candidate available for segment '{segment_key}'")]
    NoCandidateAvailable { segment_key: String },

    /// The backing store failed mid-request.
    #[error("Candidate store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),

    /// The referenced decision does not exist.
    #[error("Decision not found: {id}")]
    DecisionNotFound { id: DbId },

    /// The decision already has an outcome. Outcomes are append-only.
    #[error("Outcome already recorded for decision {decision_id}")]
    OutcomeAlreadyRecorded { decision_id: DbId },
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreUnavailable(err)
    }
}

/// Core errors reach the engine only from input validation.
impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}
