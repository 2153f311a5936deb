//! Cost and latency estimation for a request against one candidate.
//!
//! Estimates feed the hard cost filter, the coarse window-fit feature and the
//! expected cost/latency attached to the chosen candidate. When the feature
//! store has no token expectations the documented defaults apply.

use crate::candidate::CandidateProfile;
use crate::features::SegmentSnapshot;
use crate::task::TaskFeatures;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Assumed input size when the feature store reports none.
pub const DEFAULT_INPUT_TOKENS: i64 = 2_048;
/// Assumed output size when the feature store reports none.
pub const DEFAULT_OUTPUT_TOKENS: i64 = 1_024;
/// Expected latency when no segment observation exists.
pub const DEFAULT_EXPECTED_LATENCY_MS: f64 = 2_500.0;

// ---------------------------------------------------------------------------
// Estimation
// ---------------------------------------------------------------------------

/// Input tokens the request needs in the candidate's context window.
pub fn required_tokens(features: Option<&TaskFeatures>) -> i64 {
    features
        .and_then(|f| f.expected_input_tokens)
        .filter(|&t| t > 0)
        .unwrap_or(DEFAULT_INPUT_TOKENS)
}

/// Total tokens (input + output) the request is expected to consume.
pub fn expected_total_tokens(features: Option<&TaskFeatures>) -> i64 {
    let output = features
        .and_then(|f| f.expected_output_tokens)
        .filter(|&t| t > 0)
        .unwrap_or(DEFAULT_OUTPUT_TOKENS);
    required_tokens(features) + output
}

/// Expected USD cost of running the request on a candidate.
pub fn estimated_cost(profile: &CandidateProfile, total_tokens: i64) -> f64 {
    profile.unit_price_per_1k * total_tokens as f64 / 1_000.0
}

/// Expected latency for the candidate in the segment, falling back to the
/// default when the segment has no observation.
pub fn expected_latency_ms(snapshot: &SegmentSnapshot) -> f64 {
    snapshot
        .mean_latency_ms
        .unwrap_or(DEFAULT_EXPECTED_LATENCY_MS)
}
