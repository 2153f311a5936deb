//! Task, context and constraint inputs to a ranking request.
//!
//! These are the domain-side request types: the engine crate wraps them in
//! its HTTP request envelope, and the decision snapshot persists them as
//! JSONB for audit.

use crate::error::CoreError;
use crate::validation::{
    validate_count_range, validate_language_tag, validate_non_empty, validate_positive,
};

/// Maximum number of style tags accepted on a task.
pub const MAX_STYLE_TAGS: usize = 32;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Requested output format. `Json` requires the candidate's JSON mode flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Caller budget tier; biases the fine ranking weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    Low,
    Standard,
    Premium,
}

impl BudgetTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

/// Caller urgency; `High` biases the fine ranking toward low latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Normal,
    High,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// What the caller wants done.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TaskInput {
    /// Kind of work, e.g. `"draft"` or `"summarize"`.
    pub task_type: String,
    /// Payload medium, e.g. `"article"` or `"chat"`.
    pub content_type: String,
    /// Language tag the output must be produced in (`en`, `pt-BR`, ...).
    pub language: String,
    /// Task category; first part of the segment key.
    #[serde(default)]
    pub category: Option<String>,
    /// Style tags to match against candidate tags.
    #[serde(default)]
    pub style_tags: Vec<String>,
    /// Opaque reference resolved through the feature store.
    #[serde(default)]
    pub subject_ref: Option<String>,
    /// Output format requirement; `None` means plain text is fine.
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
    /// Task needs tool / function calling.
    #[serde(default)]
    pub needs_tools: bool,
    /// Task includes image input.
    #[serde(default)]
    pub needs_vision: bool,
}

impl TaskInput {
    /// Whether the task requires strict JSON output.
    pub fn requires_json(&self) -> bool {
        matches!(self.output_format, Some(OutputFormat::Json))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_non_empty(&self.task_type, "task.task_type")?;
        validate_non_empty(&self.content_type, "task.content_type")?;
        validate_language_tag(&self.language, "task.language")?;
        validate_count_range(
            self.style_tags.len() as i64,
            0,
            MAX_STYLE_TAGS as i64,
            "task.style_tags",
        )?;
        for tag in &self.style_tags {
            validate_non_empty(tag, "task.style_tags entry")?;
        }
        if let Some(category) = &self.category {
            validate_non_empty(category, "task.category")?;
        }
        Ok(())
    }
}

/// Where the request comes from.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ContextInput {
    /// Caller region; second part of the segment key.
    #[serde(default)]
    pub region: Option<String>,
    /// Delivery channel (web, mobile, api); third part of the segment key.
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub budget_tier: Option<BudgetTier>,
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

/// Hard constraints applied before any scoring.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Constraints {
    /// Drop candidates without JSON output support.
    #[serde(default)]
    pub require_json_mode: bool,
    /// If non-empty, only these providers may be considered.
    #[serde(default)]
    pub providers_allow: Vec<String>,
    /// Providers that must never be considered. Deny wins over allow.
    #[serde(default)]
    pub providers_deny: Vec<String>,
    /// Upper bound on estimated cost in USD.
    #[serde(default)]
    pub max_cost: Option<f64>,
    /// Upper bound on expected latency; enforced where latency is known.
    #[serde(default)]
    pub max_latency_ms: Option<f64>,
}

impl Constraints {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(max_cost) = self.max_cost {
            validate_positive(max_cost, "constraints.max_cost")?;
        }
        if let Some(max_latency) = self.max_latency_ms {
            validate_positive(max_latency, "constraints.max_latency_ms")?;
        }
        for provider in self.providers_allow.iter().chain(&self.providers_deny) {
            validate_non_empty(provider, "constraints provider entry")?;
        }
        Ok(())
    }

    /// Whether a provider passes the allow/deny lists.
    pub fn provider_allowed(&self, provider: &str) -> bool {
        if self.providers_deny.iter().any(|p| p == provider) {
            return false;
        }
        self.providers_allow.is_empty() || self.providers_allow.iter().any(|p| p == provider)
    }
}

// ---------------------------------------------------------------------------
// External task features
// ---------------------------------------------------------------------------

/// Features resolved for a `subject_ref` by the feature store.
///
/// Everything is optional; absent values fall back to the defaults in
/// [`crate::features`].
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TaskFeatures {
    #[serde(default)]
    pub expected_input_tokens: Option<i64>,
    #[serde(default)]
    pub expected_output_tokens: Option<i64>,
    /// Extra style tags learned for the subject, merged with the task's own.
    #[serde(default)]
    pub style_tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> TaskInput {
        TaskInput {
            task_type: "draft".into(),
            content_type: "article".into(),
            language: "en".into(),
            category: Some("marketing".into()),
            style_tags: vec!["formal".into()],
            subject_ref: None,
            output_format: None,
            needs_tools: false,
            needs_vision: false,
        }
    }

    #[test]
    fn valid_task_passes() {
        assert!(task().validate().is_ok());
    }

    #[test]
    fn rejects_empty_task_type() {
        let mut t = task();
        t.task_type = " ".into();
        assert!(t.validate().is_err());
    }

    #[test]
    fn rejects_bad_language() {
        let mut t = task();
        t.language = "English".into();
        assert!(t.validate().is_err());
    }

    #[test]
    fn rejects_blank_style_tag() {
        let mut t = task();
        t.style_tags.push(String::new());
        assert!(t.validate().is_err());
    }

    #[test]
    fn json_requirement_follows_output_format() {
        let mut t = task();
        assert!(!t.requires_json());
        t.output_format = Some(OutputFormat::Json);
        assert!(t.requires_json());
    }

    #[test]
    fn deny_wins_over_allow() {
        let constraints = Constraints {
            providers_allow: vec!["acme".into()],
            providers_deny: vec!["acme".into()],
            ..Constraints::default()
        };
        assert!(!constraints.provider_allowed("acme"));
    }

    #[test]
    fn empty_allow_list_allows_everyone_not_denied() {
        let constraints = Constraints {
            providers_deny: vec!["bad".into()],
            ..Constraints::default()
        };
        assert!(constraints.provider_allowed("acme"));
        assert!(!constraints.provider_allowed("bad"));
    }

    #[test]
    fn allow_list_restricts() {
        let constraints = Constraints {
            providers_allow: vec!["acme".into()],
            ..Constraints::default()
        };
        assert!(constraints.provider_allowed("acme"));
        assert!(!constraints.provider_allowed("other"));
    }

    #[test]
    fn constraints_reject_non_positive_bounds() {
        let constraints = Constraints {
            max_cost: Some(0.0),
            ..Constraints::default()
        };
        assert!(constraints.validate().is_err());
    }
}
