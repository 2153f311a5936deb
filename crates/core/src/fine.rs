//! Stage two: segment-aware fine ranking.
//!
//! Re-scores the coarse short-list with the extended feature vector built
//! from per-segment rolling metrics. The engine fetches snapshots and builds
//! [`FineRanked`] entries; this module owns scoring order and the
//! latency-bound drop.

use crate::candidate::CandidateProfile;
use crate::coarse::CoarseRanked;
use crate::features::{CoarseFeatures, FineFeatures, SegmentSnapshot};
use crate::weights::FineWeights;

/// One candidate after the fine pass.
#[derive(Debug, Clone)]
pub struct FineRanked {
    pub profile: CandidateProfile,
    pub coarse_features: CoarseFeatures,
    pub coarse_score: f64,
    pub fine_features: FineFeatures,
    pub fine_score: f64,
    pub snapshot: SegmentSnapshot,
    /// Request cost estimate for this candidate in USD.
    pub estimated_cost: f64,
}

impl FineRanked {
    /// Score one coarse entry against its segment snapshot.
    pub fn build(
        entry: CoarseRanked,
        snapshot: SegmentSnapshot,
        estimated_cost: f64,
        weights: &FineWeights,
    ) -> Self {
        let fine_features = FineFeatures::build(&entry.profile, &snapshot, estimated_cost);
        let fine_score = fine_features.score(&entry.features, weights);
        Self {
            profile: entry.profile,
            coarse_features: entry.features,
            coarse_score: entry.score,
            fine_features,
            fine_score,
            snapshot,
            estimated_cost,
        }
    }
}

/// Order by fine score, then coarse score, both descending.
///
/// The sort is stable, so entries equal on both scores keep the coarse-pass
/// order, which itself preserves pool order.
pub fn rank_fine(mut items: Vec<FineRanked>) -> Vec<FineRanked> {
    items.sort_by(|a, b| {
        b.fine_score
            .total_cmp(&a.fine_score)
            .then(b.coarse_score.total_cmp(&a.coarse_score))
    });
    items
}

/// Drop candidates whose observed segment latency exceeds the bound.
///
/// Candidates without a latency observation are kept; the bound only applies
/// where data exists.
pub fn drop_over_latency(items: Vec<FineRanked>, max_latency_ms: f64) -> Vec<FineRanked> {
    items
        .into_iter()
        .filter(|item| match item.snapshot.mean_latency_ms {
            Some(latency) => latency <= max_latency_ms,
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::testing::profile;

    fn coarse_entry(id: i64, coarse_score: f64) -> CoarseRanked {
        CoarseRanked {
            profile: profile(id, "acme", "m"),
            features: CoarseFeatures {
                language_match: 1.0,
                category_match: 0.5,
                style_match: 0.5,
                window_fit: 1.0,
                format_support: 1.0,
                price_tier: 0.5,
                historical_quality: 0.7,
            },
            score: coarse_score,
        }
    }

    fn snapshot(quality: f64, samples: i64) -> SegmentSnapshot {
        SegmentSnapshot {
            mean_quality: Some(quality),
            sample_count: samples,
            ..SegmentSnapshot::default()
        }
    }

    #[test]
    fn segment_quality_reorders_the_shortlist() {
        let weights = FineWeights::default();
        let strong_segment = FineRanked::build(coarse_entry(1, 0.6), snapshot(0.95, 40), 0.01, &weights);
        let weak_segment = FineRanked::build(coarse_entry(2, 0.7), snapshot(0.2, 40), 0.01, &weights);
        let ranked = rank_fine(vec![weak_segment, strong_segment]);
        assert_eq!(ranked[0].profile.id, 1);
    }

    #[test]
    fn coarse_score_breaks_fine_ties() {
        let weights = FineWeights::default();
        let lower = FineRanked::build(coarse_entry(1, 0.5), SegmentSnapshot::default(), 0.01, &weights);
        let higher = FineRanked::build(coarse_entry(2, 0.9), SegmentSnapshot::default(), 0.01, &weights);
        // Identical snapshots and features give identical fine scores.
        assert_eq!(lower.fine_score, higher.fine_score);
        let ranked = rank_fine(vec![lower, higher]);
        assert_eq!(ranked[0].profile.id, 2);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let weights = FineWeights::default();
        let a = FineRanked::build(coarse_entry(1, 0.5), SegmentSnapshot::default(), 0.01, &weights);
        let b = FineRanked::build(coarse_entry(2, 0.5), SegmentSnapshot::default(), 0.01, &weights);
        let ranked = rank_fine(vec![a, b]);
        let ids: Vec<_> = ranked.iter().map(|r| r.profile.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn latency_bound_only_drops_observed_violations() {
        let weights = FineWeights::default();
        let mut slow_snapshot = snapshot(0.8, 10);
        slow_snapshot.mean_latency_ms = Some(8_000.0);
        let slow = FineRanked::build(coarse_entry(1, 0.5), slow_snapshot, 0.01, &weights);
        let unknown = FineRanked::build(coarse_entry(2, 0.5), SegmentSnapshot::default(), 0.01, &weights);
        let kept = drop_over_latency(vec![slow, unknown], 3_000.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].profile.id, 2);
    }
}
