//! Outcome entity and recording DTO.
//!
//! Outcomes are append-only ground truth: at most one per decision, never
//! updated, never deleted. All quality fields are optional because callers
//! report what they measured and nothing more.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use modelpick_core::error::CoreError;
use modelpick_core::types::{DbId, Timestamp};
use modelpick_core::validation::{validate_positive, validate_unit_range};

/// Observed result of acting on a decision.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Outcome {
    pub id: DbId,
    pub decision_id: DbId,
    pub quality_score: Option<f64>,
    /// Normalized edit distance between produced and final text, in [0, 1].
    pub edit_ratio: Option<f64>,
    pub latency_ms: Option<f64>,
    pub cost_actual: Option<f64>,
    pub rejected: bool,
    pub created_at: Timestamp,
}

/// DTO for reporting the outcome of a decision.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordOutcomeInput {
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub edit_ratio: Option<f64>,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub cost_actual: Option<f64>,
    #[serde(default)]
    pub rejected: bool,
}

impl RecordOutcomeInput {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(quality) = self.quality_score {
            validate_unit_range(quality, "quality_score")?;
        }
        if let Some(edit_ratio) = self.edit_ratio {
            validate_unit_range(edit_ratio, "edit_ratio")?;
        }
        if let Some(latency) = self.latency_ms {
            validate_positive(latency, "latency_ms")?;
        }
        if let Some(cost) = self.cost_actual {
            if !cost.is_finite() || cost < 0.0 {
                return Err(CoreError::validation("cost_actual must be >= 0"));
            }
        }
        Ok(())
    }
}
