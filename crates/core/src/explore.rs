//! Epsilon-greedy exploration policy.
//!
//! With probability epsilon a request is answered by rank 2 or 3 of the fine
//! list instead of rank 1, so the segment keeps gathering outcome data for
//! near-best candidates. Exploration is forced off while a segment is
//! unhealthy, and epsilon itself adapts slowly to segment quality. The RNG is
//! injected so decisions are reproducible under test.

use rand::Rng;

// ---------------------------------------------------------------------------
// Policy constants
// ---------------------------------------------------------------------------

/// Exploration rate for a segment without adapted state.
pub const DEFAULT_EPSILON: f64 = 0.10;
/// Lower clamp for any effective epsilon.
pub const EPSILON_MIN: f64 = 0.05;
/// Upper clamp for any effective epsilon.
pub const EPSILON_MAX: f64 = 0.30;

/// Segment mean quality below which exploration is forced off.
pub const QUALITY_FLOOR: f64 = 0.5;
/// Segment rejection rate above which exploration is forced off.
pub const REJECTION_CEILING: f64 = 0.2;

/// Mean quality below which the adaptive step raises epsilon.
pub const ADAPT_LOW_QUALITY: f64 = 0.6;
/// Mean quality above which the adaptive step lowers epsilon.
pub const ADAPT_HIGH_QUALITY: f64 = 0.8;
/// Relative step size of one adaptation (multiplicative 10%).
pub const ADAPT_STEP: f64 = 0.10;

/// Deepest rank an exploration pick may land on.
pub const EXPLORE_MAX_RANK: usize = 3;

/// Clamp an epsilon into the allowed band.
pub fn clamp_epsilon(epsilon: f64) -> f64 {
    if !epsilon.is_finite() {
        return DEFAULT_EPSILON;
    }
    epsilon.clamp(EPSILON_MIN, EPSILON_MAX)
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Why exploration was or was not considered for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploreGate {
    /// Healthy segment, exploration eligible.
    Active,
    /// Caller disabled exploration for this request.
    Disabled,
    /// Fewer than two candidates, nothing to explore.
    SingleCandidate,
    /// Segment mean quality is below [`QUALITY_FLOOR`].
    LowSegmentQuality,
    /// Segment rejection rate is above [`REJECTION_CEILING`].
    HighRejectionRate,
}

impl ExploreGate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::SingleCandidate => "single_candidate",
            Self::LowSegmentQuality => "low_segment_quality",
            Self::HighRejectionRate => "high_rejection_rate",
        }
    }
}

/// Segment health and request state feeding one exploration decision.
#[derive(Debug, Clone, Copy)]
pub struct ExploreInputs {
    /// Whether the request allows exploration at all.
    pub enabled: bool,
    /// Per-segment epsilon before clamping.
    pub epsilon: f64,
    /// Segment-wide mean quality over the rolling window, if any samples.
    pub segment_quality: Option<f64>,
    /// Segment-wide rejection rate over the rolling window, if any samples.
    pub rejection_rate: Option<f64>,
    /// Length of the fine-ranked list.
    pub pool_len: usize,
}

/// Outcome of the exploration draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExploreDecision {
    /// Index into the fine-ranked list to answer with.
    pub index: usize,
    pub explored: bool,
    /// Effective (clamped) epsilon the draw used.
    pub epsilon: f64,
    pub gate: ExploreGate,
}

/// Decide whether to exploit rank 1 or explore a lower rank.
///
/// Exploration picks uniformly among ranks `2..=min(EXPLORE_MAX_RANK, N)`.
/// Segments with missing health data are treated as healthy; the default
/// policy already keeps their scores neutral.
pub fn decide<R: Rng + ?Sized>(inputs: &ExploreInputs, rng: &mut R) -> ExploreDecision {
    let epsilon = clamp_epsilon(inputs.epsilon);
    let gate = if !inputs.enabled {
        ExploreGate::Disabled
    } else if inputs.pool_len < 2 {
        ExploreGate::SingleCandidate
    } else if inputs
        .segment_quality
        .is_some_and(|quality| quality < QUALITY_FLOOR)
    {
        ExploreGate::LowSegmentQuality
    } else if inputs
        .rejection_rate
        .is_some_and(|rate| rate > REJECTION_CEILING)
    {
        ExploreGate::HighRejectionRate
    } else {
        ExploreGate::Active
    };

    if gate != ExploreGate::Active || rng.random::<f64>() >= epsilon {
        return ExploreDecision {
            index: 0,
            explored: false,
            epsilon,
            gate,
        };
    }

    let max_index = inputs.pool_len.min(EXPLORE_MAX_RANK) - 1;
    ExploreDecision {
        index: rng.random_range(1..=max_index),
        explored: true,
        epsilon,
        gate,
    }
}

/// One adaptive step for a segment's epsilon.
///
/// Poor quality widens exploration by 10%, strong quality narrows it by 10%,
/// the band in between leaves it unchanged. The result is always clamped.
pub fn adapt_epsilon(current: f64, mean_quality: f64) -> f64 {
    let adjusted = if mean_quality < ADAPT_LOW_QUALITY {
        current * (1.0 + ADAPT_STEP)
    } else if mean_quality > ADAPT_HIGH_QUALITY {
        current * (1.0 - ADAPT_STEP)
    } else {
        current
    };
    clamp_epsilon(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn healthy(pool_len: usize, epsilon: f64) -> ExploreInputs {
        ExploreInputs {
            enabled: true,
            epsilon,
            segment_quality: Some(0.75),
            rejection_rate: Some(0.05),
            pool_len,
        }
    }

    #[test]
    fn disabled_requests_always_exploit() {
        let mut rng = StdRng::seed_from_u64(7);
        let inputs = ExploreInputs {
            enabled: false,
            ..healthy(5, 1.0)
        };
        for _ in 0..100 {
            let decision = decide(&inputs, &mut rng);
            assert!(!decision.explored);
            assert_eq!(decision.index, 0);
            assert_eq!(decision.gate, ExploreGate::Disabled);
        }
    }

    #[test]
    fn single_candidate_never_explores() {
        let mut rng = StdRng::seed_from_u64(7);
        let decision = decide(&healthy(1, 1.0), &mut rng);
        assert!(!decision.explored);
        assert_eq!(decision.gate, ExploreGate::SingleCandidate);
    }

    #[test]
    fn low_quality_forces_exploration_off() {
        let mut rng = StdRng::seed_from_u64(7);
        let inputs = ExploreInputs {
            segment_quality: Some(0.4),
            ..healthy(5, 1.0)
        };
        for _ in 0..100 {
            let decision = decide(&inputs, &mut rng);
            assert!(!decision.explored);
            assert_eq!(decision.gate, ExploreGate::LowSegmentQuality);
        }
    }

    #[test]
    fn high_rejection_forces_exploration_off() {
        let mut rng = StdRng::seed_from_u64(7);
        let inputs = ExploreInputs {
            rejection_rate: Some(0.35),
            ..healthy(5, 1.0)
        };
        let decision = decide(&inputs, &mut rng);
        assert!(!decision.explored);
        assert_eq!(decision.gate, ExploreGate::HighRejectionRate);
    }

    #[test]
    fn missing_health_data_counts_as_healthy() {
        let mut rng = StdRng::seed_from_u64(3);
        let inputs = ExploreInputs {
            segment_quality: None,
            rejection_rate: None,
            ..healthy(5, 1.0)
        };
        let explored = (0..200).any(|_| decide(&inputs, &mut rng).explored);
        assert!(explored);
    }

    #[test]
    fn explored_picks_stay_in_rank_window() {
        let mut rng = StdRng::seed_from_u64(11);
        // decide clamps the rate to EPSILON_MAX, so the 1.0 here runs at
        // 0.30: roughly 150 of the 500 draws explore, plenty to land on
        // every explorable rank.
        let inputs = healthy(8, 1.0);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let decision = decide(&inputs, &mut rng);
            if decision.explored {
                seen.insert(decision.index);
                assert!(decision.index >= 1 && decision.index <= 2);
            }
        }
        assert_eq!(seen, [1, 2].into_iter().collect());
    }

    #[test]
    fn two_candidate_pool_explores_rank_two_only() {
        let mut rng = StdRng::seed_from_u64(11);
        let inputs = healthy(2, 1.0);
        for _ in 0..200 {
            let decision = decide(&inputs, &mut rng);
            if decision.explored {
                assert_eq!(decision.index, 1);
            }
        }
    }

    #[test]
    fn exploration_frequency_tracks_epsilon() {
        let mut rng = StdRng::seed_from_u64(42);
        let inputs = healthy(5, 0.30);
        let explored = (0..10_000)
            .filter(|_| decide(&inputs, &mut rng).explored)
            .count();
        // 10k draws at epsilon 0.30; generous band around the expectation.
        assert!((2_600..=3_400).contains(&explored), "explored {explored} times");
    }

    #[test]
    fn epsilon_is_clamped_into_band() {
        let mut rng = StdRng::seed_from_u64(1);
        let decision = decide(&healthy(5, 0.9), &mut rng);
        assert_eq!(decision.epsilon, EPSILON_MAX);
        let decision = decide(&healthy(5, 0.0), &mut rng);
        assert_eq!(decision.epsilon, EPSILON_MIN);
        let decision = decide(&healthy(5, f64::NAN), &mut rng);
        assert_eq!(decision.epsilon, DEFAULT_EPSILON);
    }

    #[test]
    fn adapt_raises_on_poor_quality() {
        let next = adapt_epsilon(0.10, 0.5);
        assert!((next - 0.11).abs() < 1e-9);
    }

    #[test]
    fn adapt_lowers_on_strong_quality() {
        let next = adapt_epsilon(0.10, 0.9);
        assert!((next - 0.09).abs() < 1e-9);
    }

    #[test]
    fn adapt_keeps_mid_band_quality() {
        assert_eq!(adapt_epsilon(0.10, 0.7), 0.10);
    }

    #[test]
    fn adapt_respects_clamp_bounds() {
        assert_eq!(adapt_epsilon(EPSILON_MAX, 0.2), EPSILON_MAX);
        assert_eq!(adapt_epsilon(EPSILON_MIN, 0.95), EPSILON_MIN);
    }
}
