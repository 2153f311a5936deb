#![allow(dead_code)]

use std::sync::Arc;

use sqlx::PgPool;

use modelpick_core::capabilities::Capabilities;
use modelpick_core::task::{Constraints, ContextInput, TaskInput};
use modelpick_core::types::DbId;
use modelpick_db::models::candidate::UpsertCandidateInput;
use modelpick_db::repositories::CandidateRepo;
use modelpick_engine::{EngineConfig, NoopFeatureStore, RankOptions, RankOrchestrator, RankRequest};

/// Orchestrator wired with default config and no feature store.
pub fn orchestrator(pool: &PgPool) -> RankOrchestrator {
    RankOrchestrator::new(
        pool.clone(),
        EngineConfig::default(),
        Arc::new(NoopFeatureStore),
    )
}

/// Seed an active English candidate with JSON and tool support.
pub async fn seed_candidate(pool: &PgPool, provider: &str, name: &str) -> DbId {
    let capabilities = Capabilities {
        json_mode: true,
        tool_use: true,
        ..Capabilities::default()
    };
    seed_candidate_with(pool, provider, name, capabilities, 0.01, None).await
}

pub async fn seed_candidate_with(
    pool: &PgPool,
    provider: &str,
    name: &str,
    capabilities: Capabilities,
    unit_price_per_1k: f64,
    quality_score: Option<f64>,
) -> DbId {
    let input = UpsertCandidateInput {
        provider: provider.to_string(),
        name: name.to_string(),
        version: String::new(),
        languages: vec!["en".to_string()],
        capabilities,
        context_window: 16_000,
        max_output_tokens: 4_000,
        unit_price_per_1k,
        tags: vec![],
        quality_score,
        stability_score: None,
    };
    CandidateRepo::upsert(pool, &input).await.unwrap().id
}

/// Insert a rollup row directly, bypassing the refresh task.
pub async fn seed_rollup(
    pool: &PgPool,
    segment_key: &str,
    candidate_id: DbId,
    mean_quality: Option<f64>,
    mean_latency_ms: Option<f64>,
    rejection_rate: f64,
    sample_count: i64,
) {
    sqlx::query(
        "INSERT INTO segment_rollups \
            (segment_key, candidate_id, mean_quality, rejection_rate, \
             mean_latency_ms, sample_count, window_start) \
         VALUES ($1, $2, $3, $4, $5, $6, NOW() - INTERVAL '1 hour')",
    )
    .bind(segment_key)
    .bind(candidate_id)
    .bind(mean_quality)
    .bind(rejection_rate)
    .bind(mean_latency_ms)
    .bind(sample_count)
    .execute(pool)
    .await
    .unwrap();
}

/// Valid request for the `marketing:eu:web` segment with exploration off.
pub fn request() -> RankRequest {
    RankRequest {
        task: TaskInput {
            task_type: "draft".into(),
            content_type: "article".into(),
            language: "en".into(),
            category: Some("marketing".into()),
            style_tags: vec![],
            subject_ref: None,
            output_format: None,
            needs_tools: false,
            needs_vision: false,
        },
        context: ContextInput {
            region: Some("eu".into()),
            channel: Some("web".into()),
            budget_tier: None,
            urgency: None,
        },
        constraints: Constraints::default(),
        options: RankOptions {
            explore: false,
            ..RankOptions::default()
        },
    }
}

pub const SEGMENT: &str = "marketing:eu:web";

/// RNG that always draws zero. When the gate is open, the explore roll
/// always fires and the uniform pick lands on rank 2.
pub struct ZeroRng;

impl rand::RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }
}
