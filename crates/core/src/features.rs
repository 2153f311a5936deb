//! Feature extraction and the default policy for missing data.
//!
//! Every score in the engine is a weighted mean over features normalized to
//! `[0, 1]`. Candidates must never be rewarded or punished for missing data,
//! so each feature has exactly one documented default and every consumer goes
//! through this module to apply it.

use crate::candidate::{CandidateProfile, LanguageMatch};
use crate::estimate::DEFAULT_EXPECTED_LATENCY_MS;
use crate::task::TaskInput;
use crate::weights::{CoarseWeights, FineWeights};

// ---------------------------------------------------------------------------
// Default policy
// ---------------------------------------------------------------------------

/// Historical quality when a candidate has no rolling snapshot yet.
pub const DEFAULT_HISTORICAL_QUALITY: f64 = 0.7;
/// Segment quality when a segment has no samples for the candidate.
pub const DEFAULT_SEGMENT_QUALITY: f64 = 0.7;
/// Stability when neither segment data nor a candidate snapshot exists.
pub const DEFAULT_STABILITY: f64 = 0.8;
/// Neutral value for match features with nothing to match against.
pub const UNKNOWN_MATCH: f64 = 0.5;

/// Window-fit value when the context window is below the requirement.
/// Under-window candidates stay rankable, just penalized.
pub const WINDOW_TIGHT: f64 = 0.5;

/// Latency normalization bounds in milliseconds.
pub const LATENCY_NORM_MIN_MS: f64 = 1_000.0;
pub const LATENCY_NORM_MAX_MS: f64 = 10_000.0;

/// Cost normalization bounds in USD per request.
pub const COST_NORM_MIN: f64 = 0.001;
pub const COST_NORM_MAX: f64 = 0.5;

// ---------------------------------------------------------------------------
// Normalization helpers
// ---------------------------------------------------------------------------

/// Map `value` into `[0, 1]` where `lo` maps to 1.0 and `hi` to 0.0.
///
/// Used for "lower is better" quantities (price, latency, cost). A degenerate
/// range (`hi <= lo`) scores 1.0 so uniform pools stay neutral.
pub fn normalize_inverted(value: f64, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return 1.0;
    }
    ((hi - value) / (hi - lo)).clamp(0.0, 1.0)
}

/// Weighted mean over `(feature, weight)` pairs.
///
/// A zero (or negative) total weight degrades to the plain arithmetic mean so
/// a misconfigured weight table cannot divide by zero.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let total: f64 = pairs.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return pairs.iter().map(|(f, _)| f).sum::<f64>() / pairs.len() as f64;
    }
    pairs.iter().map(|(f, w)| f * w).sum::<f64>() / total
}

/// Observed unit-price bounds of a candidate pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl PriceBounds {
    /// Derive bounds from a pool. An empty pool yields a degenerate range.
    pub fn from_pool(pool: &[CandidateProfile]) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for profile in pool {
            min = min.min(profile.unit_price_per_1k);
            max = max.max(profile.unit_price_per_1k);
        }
        if min > max {
            Self { min: 0.0, max: 0.0 }
        } else {
            Self { min, max }
        }
    }

    /// Price-tier feature: cheapest candidate 1.0, most expensive 0.0.
    pub fn tier(&self, price: f64) -> f64 {
        normalize_inverted(price, self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Coarse features
// ---------------------------------------------------------------------------

/// Stateless stage-one features, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CoarseFeatures {
    pub language_match: f64,
    pub category_match: f64,
    pub style_match: f64,
    pub window_fit: f64,
    pub format_support: f64,
    pub price_tier: f64,
    pub historical_quality: f64,
}

impl CoarseFeatures {
    /// Extract stage-one features for one candidate.
    ///
    /// `style_tags` is the merged task + feature-store tag list and
    /// `required_tokens` the estimated input size; both are computed once per
    /// request by the caller.
    pub fn extract(
        profile: &CandidateProfile,
        task: &TaskInput,
        style_tags: &[String],
        required_tokens: i64,
        prices: PriceBounds,
    ) -> Self {
        let language_match = match profile.language_match(&task.language) {
            LanguageMatch::Exact | LanguageMatch::Primary => 1.0,
            LanguageMatch::None => 0.0,
        };

        let category_match = match &task.category {
            Some(category) => {
                if profile.has_tag(category) {
                    1.0
                } else {
                    0.0
                }
            }
            None => UNKNOWN_MATCH,
        };

        let style_match = if style_tags.is_empty() {
            UNKNOWN_MATCH
        } else {
            let matched = style_tags.iter().filter(|t| profile.has_tag(t)).count();
            matched as f64 / style_tags.len() as f64
        };

        let window_fit = if profile.context_window >= required_tokens {
            1.0
        } else {
            WINDOW_TIGHT
        };

        let format_support = if profile.capabilities.json_mode { 1.0 } else { 0.0 };

        Self {
            language_match,
            category_match,
            style_match,
            window_fit,
            format_support,
            price_tier: prices.tier(profile.unit_price_per_1k),
            historical_quality: profile.quality_score.unwrap_or(DEFAULT_HISTORICAL_QUALITY),
        }
    }

    /// Weighted stage-one score in `[0, 1]`.
    pub fn score(&self, weights: &CoarseWeights) -> f64 {
        weighted_mean(&[
            (self.language_match, weights.language_match),
            (self.category_match, weights.category_match),
            (self.style_match, weights.style_match),
            (self.window_fit, weights.window_fit),
            (self.format_support, weights.format_support),
            (self.price_tier, weights.price_tier),
            (self.historical_quality, weights.historical_quality),
        ])
    }
}

// ---------------------------------------------------------------------------
// Segment snapshot and fine features
// ---------------------------------------------------------------------------

/// Rolling per-segment metrics for one candidate, as read from the rollup
/// store. All fields optional; zero samples means an empty snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentSnapshot {
    pub mean_quality: Option<f64>,
    pub mean_latency_ms: Option<f64>,
    pub mean_cost: Option<f64>,
    /// `1 - rejection rate` over the window.
    pub stability: Option<f64>,
    pub sample_count: i64,
}

/// Stage-two features layered on top of [`CoarseFeatures`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct FineFeatures {
    pub segment_quality: f64,
    pub segment_latency: f64,
    pub segment_cost: f64,
    pub recent_stability: f64,
}

impl FineFeatures {
    /// Build stage-two features from the segment snapshot, falling back to
    /// the candidate snapshot and finally the default policy.
    ///
    /// `estimated_cost` is the request's own cost estimate, used when the
    /// segment has no observed cost yet.
    pub fn build(
        profile: &CandidateProfile,
        snapshot: &SegmentSnapshot,
        estimated_cost: f64,
    ) -> Self {
        let latency = snapshot
            .mean_latency_ms
            .unwrap_or(DEFAULT_EXPECTED_LATENCY_MS);
        let cost = snapshot.mean_cost.unwrap_or(estimated_cost);
        let stability = snapshot
            .stability
            .or(profile.stability_score)
            .unwrap_or(DEFAULT_STABILITY);

        Self {
            segment_quality: snapshot.mean_quality.unwrap_or(DEFAULT_SEGMENT_QUALITY),
            segment_latency: normalize_inverted(latency, LATENCY_NORM_MIN_MS, LATENCY_NORM_MAX_MS),
            segment_cost: normalize_inverted(cost, COST_NORM_MIN, COST_NORM_MAX),
            recent_stability: stability,
        }
    }

    /// Weighted stage-two score over the extended feature vector.
    pub fn score(&self, coarse: &CoarseFeatures, weights: &FineWeights) -> f64 {
        weighted_mean(&[
            (coarse.language_match, weights.base.language_match),
            (coarse.category_match, weights.base.category_match),
            (coarse.style_match, weights.base.style_match),
            (coarse.window_fit, weights.base.window_fit),
            (coarse.format_support, weights.base.format_support),
            (coarse.price_tier, weights.base.price_tier),
            (coarse.historical_quality, weights.base.historical_quality),
            (self.segment_quality, weights.segment_quality),
            (self.segment_latency, weights.segment_latency),
            (self.segment_cost, weights.segment_cost),
            (self.recent_stability, weights.recent_stability),
        ])
    }
}
