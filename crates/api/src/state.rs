use std::sync::Arc;

use modelpick_engine::{
    EngineConfig, FeatureStore, HealthGuard, HttpFeatureStore, NoopFeatureStore, RankOrchestrator,
};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: modelpick_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The rank orchestrator handling `/rank` requests.
    pub orchestrator: Arc<RankOrchestrator>,
    /// Circuit breaker and last-known-good state, shared with the orchestrator.
    pub guard: HealthGuard,
}

impl AppState {
    /// Wire the full state from a pool and the two config layers.
    pub fn new(
        pool: modelpick_db::DbPool,
        config: ServerConfig,
        engine_config: EngineConfig,
    ) -> Self {
        let feature_store: Arc<dyn FeatureStore> = match &config.feature_store_url {
            Some(url) => Arc::new(HttpFeatureStore::new(url.as_str())),
            None => Arc::new(NoopFeatureStore),
        };
        let guard = HealthGuard::new(pool.clone(), engine_config.clone());
        let orchestrator = Arc::new(RankOrchestrator::new(
            pool.clone(),
            engine_config,
            feature_store,
        ));

        Self {
            pool,
            config: Arc::new(config),
            orchestrator,
            guard,
        }
    }
}
