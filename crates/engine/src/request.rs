//! Rank request envelope.

use modelpick_core::coarse::DEFAULT_TOP_K;
use modelpick_core::error::CoreError;
use modelpick_core::segment;
use modelpick_core::task::{Constraints, ContextInput, TaskInput};
use modelpick_core::validation::{validate_count_range, validate_non_empty, validate_positive};

use crate::orchestrator::STRATEGY_VERSION;

/// Upper bound on `options.top_k`.
pub const MAX_TOP_K: usize = 50;

/// Upper bound on the idempotency key length.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Per-request knobs. Everything is optional.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RankOptions {
    /// Idempotency key: the same id replays the stored decision.
    #[serde(default)]
    pub request_id: Option<String>,
    /// Coarse survivors to carry into the fine pass (default 8).
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Whether this request may be used for exploration (default true).
    #[serde(default = "default_explore")]
    pub explore: bool,
    /// Pin a ranking strategy; only the current one is accepted.
    #[serde(default)]
    pub strategy_version: Option<String>,
    /// Overall deadline for the request in milliseconds.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

fn default_explore() -> bool {
    true
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            request_id: None,
            top_k: None,
            explore: true,
            strategy_version: None,
            deadline_ms: None,
        }
    }
}

impl RankOptions {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(request_id) = &self.request_id {
            validate_non_empty(request_id, "options.request_id")?;
            validate_count_range(
                request_id.len() as i64,
                1,
                MAX_REQUEST_ID_LEN as i64,
                "options.request_id length",
            )?;
        }
        if let Some(top_k) = self.top_k {
            validate_count_range(top_k as i64, 1, MAX_TOP_K as i64, "options.top_k")?;
        }
        if let Some(strategy) = &self.strategy_version {
            if strategy != STRATEGY_VERSION {
                return Err(CoreError::validation(format!(
                    "options.strategy_version '{strategy}' is not supported"
                )));
            }
        }
        if let Some(deadline_ms) = self.deadline_ms {
            validate_positive(deadline_ms as f64, "options.deadline_ms")?;
        }
        Ok(())
    }

    /// Coarse cut size with the default applied.
    pub fn effective_top_k(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_TOP_K)
    }
}

/// One rank request: the task plus optional context, constraints and knobs.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RankRequest {
    pub task: TaskInput,
    #[serde(default)]
    pub context: ContextInput,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub options: RankOptions,
}

impl RankRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        self.task.validate()?;
        self.constraints.validate()?;
        self.options.validate()?;
        Ok(())
    }

    /// Segment key this request aggregates under.
    pub fn segment_key(&self) -> String {
        segment::segment_key(
            self.task.category.as_deref(),
            self.context.region.as_deref(),
            self.context.channel.as_deref(),
        )
    }
}
