//! Materialized rolling segment metrics.

use serde::Serialize;
use sqlx::FromRow;

use modelpick_core::features::SegmentSnapshot;
use modelpick_core::types::{DbId, Timestamp};

/// `candidate_id` of the segment-wide aggregate row.
pub const SEGMENT_WIDE_CANDIDATE_ID: DbId = 0;

/// Rolling window aggregates for one (segment, candidate) pair, or for the
/// whole segment when `candidate_id` is [`SEGMENT_WIDE_CANDIDATE_ID`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SegmentRollup {
    pub segment_key: String,
    pub candidate_id: DbId,
    pub mean_quality: Option<f64>,
    pub mean_edit_ratio: Option<f64>,
    pub rejection_rate: f64,
    pub mean_cost: Option<f64>,
    pub mean_latency_ms: Option<f64>,
    pub sample_count: i64,
    pub window_start: Timestamp,
    pub refreshed_at: Timestamp,
}

impl SegmentRollup {
    pub fn is_segment_wide(&self) -> bool {
        self.candidate_id == SEGMENT_WIDE_CANDIDATE_ID
    }

    /// View of the row as the snapshot consumed by the fine ranker.
    pub fn snapshot(&self) -> SegmentSnapshot {
        let stability = if self.sample_count > 0 {
            Some((1.0 - self.rejection_rate).clamp(0.0, 1.0))
        } else {
            None
        };
        SegmentSnapshot {
            mean_quality: self.mean_quality,
            mean_latency_ms: self.mean_latency_ms,
            mean_cost: self.mean_cost,
            stability,
            sample_count: self.sample_count,
        }
    }
}
