//! Candidate registry entity and DTOs.
//!
//! A candidate is one rankable (provider, name, version) configuration. The
//! row carries the static registry data plus the rolling quality/stability
//! snapshot maintained by the rollup refresh task.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use modelpick_core::candidate::CandidateProfile;
use modelpick_core::capabilities::Capabilities;
use modelpick_core::error::CoreError;
use modelpick_core::types::{DbId, Timestamp};
use modelpick_core::validation::{validate_non_empty, validate_unit_range};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a candidate. Inactive candidates keep their history
/// but never enter a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Active,
    Inactive,
}

impl CandidateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A registry row for one rankable provider model configuration.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Candidate {
    pub id: DbId,
    pub provider: String,
    pub name: String,
    pub version: String,
    pub status: String,
    pub languages: Vec<String>,
    pub capabilities: serde_json::Value,
    pub context_window: i64,
    pub max_output_tokens: i64,
    pub unit_price_per_1k: f64,
    pub quality_score: Option<f64>,
    pub stability_score: Option<f64>,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Candidate {
    pub fn is_active(&self) -> bool {
        self.status == CandidateStatus::Active.as_str()
    }

    /// Flatten the row into the profile the ranking passes consume.
    ///
    /// Fails if the stored capabilities payload does not parse; callers skip
    /// such rows and log rather than failing the whole pool.
    pub fn to_profile(&self) -> Result<CandidateProfile, CoreError> {
        let capabilities = Capabilities::from_value(&self.capabilities)?;
        Ok(CandidateProfile {
            id: self.id,
            provider: self.provider.clone(),
            name: self.name.clone(),
            languages: self.languages.clone(),
            capabilities,
            context_window: self.context_window,
            max_output_tokens: self.max_output_tokens,
            unit_price_per_1k: self.unit_price_per_1k,
            quality_score: self.quality_score,
            stability_score: self.stability_score,
            tags: self.tags.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for registering or updating a candidate. The (provider, name,
/// version) triple is the natural key; re-posting it updates the row.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertCandidateInput {
    pub provider: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub capabilities: Capabilities,
    pub context_window: i64,
    pub max_output_tokens: i64,
    pub unit_price_per_1k: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional seed for the quality snapshot before any outcomes exist.
    #[serde(default)]
    pub quality_score: Option<f64>,
    /// Optional seed for the stability snapshot.
    #[serde(default)]
    pub stability_score: Option<f64>,
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

impl UpsertCandidateInput {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_non_empty(&self.provider, "provider")?;
        validate_non_empty(&self.name, "name")?;
        if self.context_window <= 0 {
            return Err(CoreError::validation("context_window must be positive"));
        }
        if self.max_output_tokens <= 0 {
            return Err(CoreError::validation("max_output_tokens must be positive"));
        }
        if !self.unit_price_per_1k.is_finite() || self.unit_price_per_1k < 0.0 {
            return Err(CoreError::validation("unit_price_per_1k must be >= 0"));
        }
        if self.languages.is_empty() {
            return Err(CoreError::validation("languages must not be empty"));
        }
        for language in &self.languages {
            validate_non_empty(language, "languages entry")?;
        }
        if let Some(quality) = self.quality_score {
            validate_unit_range(quality, "quality_score")?;
        }
        if let Some(stability) = self.stability_score {
            validate_unit_range(stability, "stability_score")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> UpsertCandidateInput {
        UpsertCandidateInput {
            provider: "acme".into(),
            name: "swift-1".into(),
            version: "2026-01".into(),
            languages: vec!["en".into()],
            capabilities: Capabilities::default(),
            context_window: 16_000,
            max_output_tokens: 4_000,
            unit_price_per_1k: 0.01,
            tags: vec![],
            quality_score: None,
            stability_score: None,
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn rejects_empty_provider() {
        let mut i = input();
        i.provider = "".into();
        assert!(i.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_window() {
        let mut i = input();
        i.context_window = 0;
        assert!(i.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_quality_seed() {
        let mut i = input();
        i.quality_score = Some(1.5);
        assert!(i.validate().is_err());
    }

    #[test]
    fn status_round_trips() {
        assert_eq!(
            CandidateStatus::from_str(CandidateStatus::Active.as_str()),
            Some(CandidateStatus::Active)
        );
        assert_eq!(CandidateStatus::from_str("retired"), None);
    }

    #[test]
    fn profile_conversion_parses_capabilities() {
        let candidate = Candidate {
            id: 1,
            provider: "acme".into(),
            name: "swift-1".into(),
            version: "".into(),
            status: "active".into(),
            languages: vec!["en".into()],
            capabilities: serde_json::json!({ "json_mode": true }),
            context_window: 16_000,
            max_output_tokens: 4_000,
            unit_price_per_1k: 0.01,
            quality_score: Some(0.8),
            stability_score: None,
            tags: vec!["marketing".into()],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let profile = candidate.to_profile().expect("profile converts");
        assert!(profile.capabilities.json_mode);
        assert_eq!(profile.quality_score, Some(0.8));
    }

    #[test]
    fn profile_conversion_rejects_corrupt_capabilities() {
        let mut candidate = Candidate {
            id: 1,
            provider: "acme".into(),
            name: "swift-1".into(),
            version: "".into(),
            status: "active".into(),
            languages: vec!["en".into()],
            capabilities: serde_json::json!({ "json_mode": true }),
            context_window: 16_000,
            max_output_tokens: 4_000,
            unit_price_per_1k: 0.01,
            quality_score: None,
            stability_score: None,
            tags: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        candidate.capabilities = serde_json::json!([1, 2, 3]);
        assert!(candidate.to_profile().is_err());
    }
}
