//! Rank response envelope.

use serde::Serialize;

use modelpick_core::types::DbId;
use modelpick_db::models::decision::SnapshotEntry;

/// Machine-readable caveats attached to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Warning {
    /// The request id matched a stored decision; nothing was re-ranked.
    IdempotentCacheHit,
    /// Filtering came up empty; the chosen candidate is the LKG entry.
    FallbackUsed,
    /// The fine pass missed the deadline; the order is coarse-only.
    CoarseOnly,
    /// One or more segment metric lookups failed; defaults were used.
    MetricsDegraded,
}

/// Wall-clock phase timings in milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Timings {
    pub coarse_ms: u64,
    pub fine_ms: u64,
    pub total_ms: u64,
}

/// One ranked candidate as answered to the caller.
///
/// `fine_score` is absent on coarse-only and fallback paths; fallback
/// entries carry no scores at all.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub candidate_id: DbId,
    pub provider: String,
    pub name: String,
    pub coarse_score: Option<f64>,
    pub fine_score: Option<f64>,
    pub expected_cost: Option<f64>,
    pub expected_latency_ms: Option<f64>,
}

impl From<&SnapshotEntry> for RankedCandidate {
    fn from(entry: &SnapshotEntry) -> Self {
        Self {
            candidate_id: entry.candidate_id,
            provider: entry.provider.clone(),
            name: entry.name.clone(),
            coarse_score: entry.coarse_score,
            fine_score: entry.fine_score,
            expected_cost: entry.expected_cost,
            expected_latency_ms: entry.expected_latency_ms,
        }
    }
}

/// Answer to one rank request.
#[derive(Debug, Clone, Serialize)]
pub struct RankResponse {
    pub decision_id: DbId,
    pub candidate_set_id: DbId,
    pub segment_key: String,
    pub strategy_version: String,
    pub weights_version: String,
    pub chosen: RankedCandidate,
    /// The ranked list the choice was made from, best first.
    pub candidates: Vec<RankedCandidate>,
    /// Up to two next-best entries after the chosen one.
    pub alternates: Vec<RankedCandidate>,
    pub explored: bool,
    pub fallback_used: bool,
    pub warnings: Vec<Warning>,
    pub timings: Timings,
}
