//! Candidate profile as seen by the ranking passes.
//!
//! A profile is the static registry row plus the dynamic quality/stability
//! snapshot, flattened to exactly the fields scoring needs. The db crate
//! converts its `Candidate` entity into this type; ranking never sees rows.

use crate::capabilities::Capabilities;
use crate::types::DbId;
use crate::validation::language_primary;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CandidateProfile {
    pub id: DbId,
    pub provider: String,
    pub name: String,
    /// Language tags the candidate declares (`en`, `pt-BR`, ...).
    pub languages: Vec<String>,
    pub capabilities: Capabilities,
    /// Maximum context window in tokens.
    pub context_window: i64,
    pub max_output_tokens: i64,
    /// Price in USD per 1000 tokens.
    pub unit_price_per_1k: f64,
    /// Rolling quality snapshot in `[0, 1]`, refreshed from outcomes.
    pub quality_score: Option<f64>,
    /// Rolling stability snapshot in `[0, 1]` (1 - rejection rate).
    pub stability_score: Option<f64>,
    /// Free-form tags matched against task category and style tags.
    pub tags: Vec<String>,
}

/// How well a candidate's declared languages match a requested tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageMatch {
    /// Declares the exact tag, region subtag included.
    Exact,
    /// Declares the primary subtag only (`en` for a `en-GB` request).
    Primary,
    None,
}

impl CandidateProfile {
    /// Grade how the requested language matches the declared list.
    pub fn language_match(&self, requested: &str) -> LanguageMatch {
        if self.languages.iter().any(|lang| lang == requested) {
            return LanguageMatch::Exact;
        }
        let primary = language_primary(requested);
        if self
            .languages
            .iter()
            .any(|lang| language_primary(lang) == primary)
        {
            return LanguageMatch::Primary;
        }
        LanguageMatch::None
    }

    /// Case-insensitive tag membership test.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Build a reasonable default profile for unit tests.
    pub fn profile(id: DbId, provider: &str, name: &str) -> CandidateProfile {
        CandidateProfile {
            id,
            provider: provider.to_string(),
            name: name.to_string(),
            languages: vec!["en".to_string()],
            capabilities: Capabilities::default(),
            context_window: 16_000,
            max_output_tokens: 4_000,
            unit_price_per_1k: 0.01,
            quality_score: None,
            stability_score: None,
            tags: Vec::new(),
        }
    }
}
