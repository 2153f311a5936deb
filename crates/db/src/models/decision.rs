//! Decision log entities: the persisted candidate-set snapshot and the pick
//! made against it.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use modelpick_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// The ranked snapshot a decision was made against, stored as JSONB for
/// audit and replay.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CandidateSet {
    pub id: DbId,
    pub segment_key: String,
    pub task: serde_json::Value,
    pub context: serde_json::Value,
    pub constraints: serde_json::Value,
    pub entries: serde_json::Value,
    pub created_at: Timestamp,
}

impl CandidateSet {
    /// Decode the ranked entries payload.
    pub fn decoded_entries(&self) -> Result<Vec<SnapshotEntry>, serde_json::Error> {
        serde_json::from_value(self.entries.clone())
    }
}

/// One ranked candidate inside a persisted snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub candidate_id: DbId,
    pub provider: String,
    pub name: String,
    pub coarse_score: Option<f64>,
    pub fine_score: Option<f64>,
    pub expected_cost: Option<f64>,
    pub expected_latency_ms: Option<f64>,
}

/// The pick answered to the caller, linked to its snapshot.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Decision {
    pub id: DbId,
    pub request_id: Option<String>,
    pub candidate_set_id: DbId,
    pub chosen_candidate_id: DbId,
    pub segment_key: String,
    pub strategy_version: String,
    pub weights_version: String,
    pub explored: bool,
    pub fallback_used: bool,
    /// Coarse score of the chosen candidate.
    pub coarse_score: Option<f64>,
    /// Fine score of the chosen candidate; NULL on coarse-only or fallback.
    pub fine_score: Option<f64>,
    pub expected_cost: f64,
    pub expected_latency_ms: f64,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Everything needed to persist a decision and its snapshot atomically.
#[derive(Debug, Clone)]
pub struct NewDecision {
    pub request_id: Option<String>,
    pub chosen_candidate_id: DbId,
    pub segment_key: String,
    pub strategy_version: &'static str,
    pub weights_version: &'static str,
    pub explored: bool,
    pub fallback_used: bool,
    pub coarse_score: Option<f64>,
    pub fine_score: Option<f64>,
    pub expected_cost: f64,
    pub expected_latency_ms: f64,
    pub task: serde_json::Value,
    pub context: serde_json::Value,
    pub constraints: serde_json::Value,
    pub entries: Vec<SnapshotEntry>,
}

/// Query parameters for listing decisions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionListQuery {
    pub segment_key: Option<String>,
    pub candidate_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
