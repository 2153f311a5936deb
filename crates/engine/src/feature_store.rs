//! Task feature lookups for `subject_ref`.
//!
//! The store is a seam: production talks HTTP to the feature service,
//! deployments without one wire in [`NoopFeatureStore`]. A failed lookup
//! never fails a rank request; the orchestrator ranks with defaults.

use std::time::Duration;

use async_trait::async_trait;

use modelpick_core::task::TaskFeatures;

/// HTTP request timeout for a single lookup.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for feature store lookups.
#[derive(Debug, thiserror::Error)]
pub enum FeatureStoreError {
    /// The underlying HTTP request failed (network, DNS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned an unexpected status code.
    #[error("Feature store returned HTTP {0}")]
    HttpStatus(u16),
}

/// Resolves task features for an opaque subject reference.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Features for `subject_ref`, or `None` when the store does not know it.
    async fn get_features_by_ref(
        &self,
        subject_ref: &str,
    ) -> Result<Option<TaskFeatures>, FeatureStoreError>;
}

// ---------------------------------------------------------------------------
// NoopFeatureStore
// ---------------------------------------------------------------------------

/// Feature store that knows nothing. Every ranking falls back to defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeatureStore;

#[async_trait]
impl FeatureStore for NoopFeatureStore {
    async fn get_features_by_ref(
        &self,
        _subject_ref: &str,
    ) -> Result<Option<TaskFeatures>, FeatureStoreError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// HttpFeatureStore
// ---------------------------------------------------------------------------

/// Feature store backed by an HTTP service.
///
/// Looks up `GET {base_url}/features/{subject_ref}`; a 404 means the
/// subject is unknown and is not an error.
pub struct HttpFeatureStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeatureStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }
}

#[async_trait]
impl FeatureStore for HttpFeatureStore {
    async fn get_features_by_ref(
        &self,
        subject_ref: &str,
    ) -> Result<Option<TaskFeatures>, FeatureStoreError> {
        let url = format!("{}/features/{}", self.base_url, subject_ref);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(FeatureStoreError::HttpStatus(response.status().as_u16()));
        }

        let features = response.json::<TaskFeatures>().await?;
        Ok(Some(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_store_knows_nothing() {
        let store = NoopFeatureStore;
        let features = store.get_features_by_ref("subject-1").await.unwrap();
        assert_eq!(features, None);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = HttpFeatureStore::new("http://features.local/");
        assert_eq!(store.base_url, "http://features.local");
    }
}
