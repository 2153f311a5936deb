//! Stage one: stateless coarse ranking.
//!
//! Scores the whole filtered pool on cheap, request-local features and keeps
//! the top K for the fine pass. Sorting is stable, so candidates with equal
//! scores keep their pool order and a request is reproducible against the
//! same pool.

use crate::candidate::CandidateProfile;
use crate::features::{CoarseFeatures, PriceBounds};
use crate::task::{TaskFeatures, TaskInput};
use crate::weights::CoarseWeights;

/// Pool size carried into the fine pass.
pub const DEFAULT_TOP_K: usize = 8;

/// One candidate scored by the coarse pass.
#[derive(Debug, Clone)]
pub struct CoarseRanked {
    pub profile: CandidateProfile,
    pub features: CoarseFeatures,
    pub score: f64,
}

/// Task style tags merged with feature-store tags, case-insensitively
/// deduplicated, task tags first.
pub fn merge_style_tags(task: &TaskInput, features: Option<&TaskFeatures>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    let extra = features.map(|f| f.style_tags.as_slice()).unwrap_or(&[]);
    for tag in task.style_tags.iter().chain(extra) {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !merged.iter().any(|t| t.eq_ignore_ascii_case(trimmed)) {
            merged.push(trimmed.to_string());
        }
    }
    merged
}

/// Score the filtered pool and keep the best `top_k`, highest score first.
pub fn coarse_rank(
    pool: Vec<CandidateProfile>,
    task: &TaskInput,
    style_tags: &[String],
    required_tokens: i64,
    weights: &CoarseWeights,
    top_k: usize,
) -> Vec<CoarseRanked> {
    let prices = PriceBounds::from_pool(&pool);
    let mut ranked: Vec<CoarseRanked> = pool
        .into_iter()
        .map(|profile| {
            let features =
                CoarseFeatures::extract(&profile, task, style_tags, required_tokens, prices);
            CoarseRanked {
                score: features.score(weights),
                features,
                profile,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_k.max(1));
    ranked
}
