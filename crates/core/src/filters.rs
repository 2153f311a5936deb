//! Hard candidate filters applied before any scoring.
//!
//! A candidate that fails any filter is removed outright; filters never
//! re-order the pool. The set is deliberately small: provider allow/deny
//! lists, required capabilities (JSON mode, tools, vision) and the cost
//! cap. Language fit and context window are coarse features, not filters,
//! so a weak-but-usable candidate stays rankable. Status filtering happens
//! at load time and circuit breaker filtering in the engine.

use crate::candidate::CandidateProfile;
use crate::estimate::estimated_cost;
use crate::task::{Constraints, TaskInput};

/// Apply the hard filters, preserving pool order.
///
/// JSON support is required when either the constraint demands it or the
/// task's output format is JSON. `total_tokens` bounds the cost cap check.
pub fn apply_hard_filters(
    pool: Vec<CandidateProfile>,
    task: &TaskInput,
    constraints: &Constraints,
    total_tokens: i64,
) -> Vec<CandidateProfile> {
    let needs_json = constraints.require_json_mode || task.requires_json();
    pool.into_iter()
        .filter(|profile| constraints.provider_allowed(&profile.provider))
        .filter(|profile| {
            profile
                .capabilities
                .covers(needs_json, task.needs_tools, task.needs_vision)
        })
        .filter(|profile| match constraints.max_cost {
            Some(max_cost) => estimated_cost(profile, total_tokens) <= max_cost,
            None => true,
        })
        .collect()
}
