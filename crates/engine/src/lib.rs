//! Modelpick ranking engine.
//!
//! Stateless request-scoped orchestration over the pure ranking passes in
//! `modelpick-core` and the PostgreSQL state in `modelpick-db`:
//!
//! - [`RankOrchestrator`] runs one rank request end to end: validate,
//!   replay idempotent hits, filter the pool, coarse and fine passes,
//!   exploration draw, persisted decision.
//! - [`HealthGuard`] owns circuit breakers and the last-known-good cache.
//! - [`FeatureStore`] is the seam for external task feature lookups, with
//!   a reqwest-backed and a no-op implementation.
//! - [`outcomes`] is the append-only outcome intake for the feedback loop.
//! - [`epsilon`] holds per-segment exploration rates and the adaptive
//!   sweep.

pub mod config;
pub mod epsilon;
pub mod error;
pub mod feature_store;
pub mod health;
pub mod orchestrator;
pub mod outcomes;
pub mod request;
pub mod response;

pub use config::EngineConfig;
pub use error::EngineError;
pub use feature_store::{FeatureStore, HttpFeatureStore, NoopFeatureStore};
pub use health::{BreakerSet, HealthGuard};
pub use orchestrator::{RankOrchestrator, STRATEGY_VERSION};
pub use request::{RankOptions, RankRequest};
pub use response::{RankResponse, RankedCandidate, Timings, Warning};
