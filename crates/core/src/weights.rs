//! Scoring weight tables and context-derived bias.
//!
//! Weight values are versioned: every decision records the version it was
//! scored under so historical decisions stay interpretable after a retune.

use crate::task::{BudgetTier, ContextInput, Urgency};

/// Version stamp recorded on every decision.
pub const WEIGHTS_VERSION: &str = "w1";

/// Multiplier applied to cost weights for `budget_tier = low`.
pub const BUDGET_LOW_COST_BIAS: f64 = 1.5;
/// Multiplier applied to quality weights for `budget_tier = premium`.
pub const BUDGET_PREMIUM_QUALITY_BIAS: f64 = 1.25;
/// Multiplier applied to the latency weight for `urgency = high`.
pub const URGENCY_HIGH_LATENCY_BIAS: f64 = 1.5;

/// Stage-one weights. Stateless and identical for every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoarseWeights {
    pub language_match: f64,
    pub category_match: f64,
    pub style_match: f64,
    pub window_fit: f64,
    pub format_support: f64,
    pub price_tier: f64,
    pub historical_quality: f64,
}

impl Default for CoarseWeights {
    fn default() -> Self {
        Self {
            language_match: 2.0,
            category_match: 1.0,
            style_match: 1.0,
            window_fit: 1.5,
            format_support: 1.0,
            price_tier: 1.0,
            historical_quality: 1.5,
        }
    }
}

/// Stage-two weights over the extended feature vector.
///
/// The coarse sub-table is re-weighted independently of stage one, then the
/// four segment features are layered on top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FineWeights {
    pub base: CoarseWeights,
    pub segment_quality: f64,
    pub segment_latency: f64,
    pub segment_cost: f64,
    pub recent_stability: f64,
}

impl Default for FineWeights {
    fn default() -> Self {
        Self {
            base: CoarseWeights::default(),
            segment_quality: 2.0,
            segment_latency: 1.0,
            segment_cost: 1.0,
            recent_stability: 1.25,
        }
    }
}

impl FineWeights {
    /// Default weights biased by the request context.
    ///
    /// Low budget emphasizes both cost features, premium budget both quality
    /// features, high urgency the latency feature. Biases stack when several
    /// apply.
    pub fn biased_for(context: &ContextInput) -> Self {
        let mut weights = Self::default();
        match context.budget_tier {
            Some(BudgetTier::Low) => {
                weights.base.price_tier *= BUDGET_LOW_COST_BIAS;
                weights.segment_cost *= BUDGET_LOW_COST_BIAS;
            }
            Some(BudgetTier::Premium) => {
                weights.base.historical_quality *= BUDGET_PREMIUM_QUALITY_BIAS;
                weights.segment_quality *= BUDGET_PREMIUM_QUALITY_BIAS;
            }
            Some(BudgetTier::Standard) | None => {}
        }
        if context.urgency == Some(Urgency::High) {
            weights.segment_latency *= URGENCY_HIGH_LATENCY_BIAS;
        }
        weights
    }
}
