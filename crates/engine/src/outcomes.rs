//! Outcome intake for the feedback loop.
//!
//! Recording is append-only and never recomputes anything synchronously;
//! the rollup refresher folds outcomes into segment metrics on its own
//! cadence.

use sqlx::PgPool;

use modelpick_core::types::DbId;
use modelpick_db::models::outcome::{Outcome, RecordOutcomeInput};
use modelpick_db::repositories::{DecisionRepo, OutcomeRepo};

use crate::error::EngineError;

/// Record the caller-observed outcome for a decision.
pub async fn record_outcome(
    pool: &PgPool,
    decision_id: DbId,
    input: &RecordOutcomeInput,
) -> Result<Outcome, EngineError> {
    input.validate()?;

    let decision = DecisionRepo::find_by_id(pool, decision_id)
        .await?
        .ok_or(EngineError::DecisionNotFound { id: decision_id })?;

    match OutcomeRepo::insert(pool, decision.id, input).await {
        Ok(outcome) => {
            tracing::info!(
                decision_id = decision.id,
                candidate_id = decision.chosen_candidate_id,
                segment_key = %decision.segment_key,
                rejected = outcome.rejected,
                "Outcome recorded"
            );
            Ok(outcome)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(EngineError::OutcomeAlreadyRecorded {
                decision_id: decision.id,
            })
        }
        Err(e) => Err(EngineError::StoreUnavailable(e)),
    }
}

/// The stored outcome for a decision, if any.
pub async fn outcome_for_decision(
    pool: &PgPool,
    decision_id: DbId,
) -> Result<Option<Outcome>, EngineError> {
    Ok(OutcomeRepo::find_by_decision(pool, decision_id).await?)
}
