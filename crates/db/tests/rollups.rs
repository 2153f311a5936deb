use chrono::{Duration, Utc};
use sqlx::PgPool;

use modelpick_core::capabilities::Capabilities;
use modelpick_core::types::DbId;
use modelpick_db::models::candidate::UpsertCandidateInput;
use modelpick_db::models::decision::{NewDecision, SnapshotEntry};
use modelpick_db::models::outcome::RecordOutcomeInput;
use modelpick_db::models::segment_rollup::SEGMENT_WIDE_CANDIDATE_ID;
use modelpick_db::repositories::{CandidateRepo, DecisionRepo, OutcomeRepo, SegmentRollupRepo};

async fn seed_candidate(pool: &PgPool, name: &str) -> DbId {
    let input = UpsertCandidateInput {
        provider: "acme".to_string(),
        name: name.to_string(),
        version: String::new(),
        languages: vec!["en".to_string()],
        capabilities: Capabilities::default(),
        context_window: 16_000,
        max_output_tokens: 4_000,
        unit_price_per_1k: 0.01,
        tags: vec![],
        quality_score: None,
        stability_score: None,
    };
    CandidateRepo::upsert(pool, &input).await.unwrap().id
}

async fn seed_outcome(
    pool: &PgPool,
    candidate_id: DbId,
    segment: &str,
    quality: Option<f64>,
    latency_ms: Option<f64>,
    rejected: bool,
) -> DbId {
    let new = NewDecision {
        request_id: None,
        chosen_candidate_id: candidate_id,
        segment_key: segment.to_string(),
        strategy_version: "two-stage-v1",
        weights_version: "w1",
        explored: false,
        fallback_used: false,
        coarse_score: Some(0.7),
        fine_score: Some(0.7),
        expected_cost: 0.02,
        expected_latency_ms: 2_500.0,
        task: serde_json::json!({}),
        context: serde_json::json!({}),
        constraints: serde_json::json!({}),
        entries: vec![SnapshotEntry {
            candidate_id,
            provider: "acme".to_string(),
            name: "m".to_string(),
            coarse_score: Some(0.7),
            fine_score: Some(0.7),
            expected_cost: Some(0.02),
            expected_latency_ms: Some(2_500.0),
        }],
    };
    let decision = DecisionRepo::create_with_snapshot(pool, &new)
        .await
        .unwrap()
        .unwrap();
    let outcome = OutcomeRepo::insert(
        pool,
        decision.id,
        &RecordOutcomeInput {
            quality_score: quality,
            edit_ratio: None,
            latency_ms,
            cost_actual: Some(0.02),
            rejected,
        },
    )
    .await
    .unwrap();
    outcome.id
}

fn window_start() -> chrono::DateTime<Utc> {
    Utc::now() - Duration::hours(24)
}

#[sqlx::test(migrations = "./migrations")]
async fn refresh_materializes_per_candidate_and_segment_wide_rows(pool: PgPool) {
    let a = seed_candidate(&pool, "swift-1").await;
    let b = seed_candidate(&pool, "swift-2").await;
    let segment = "marketing:eu:web";

    seed_outcome(&pool, a, segment, Some(0.9), Some(1_000.0), false).await;
    seed_outcome(&pool, a, segment, Some(0.7), Some(3_000.0), false).await;
    seed_outcome(&pool, b, segment, Some(0.5), Some(2_000.0), true).await;

    let rows = SegmentRollupRepo::refresh(&pool, window_start()).await.unwrap();
    assert_eq!(rows, 3, "two candidate rows plus the segment-wide row");

    let for_a = SegmentRollupRepo::find(&pool, segment, a).await.unwrap().unwrap();
    assert_eq!(for_a.sample_count, 2);
    assert!((for_a.mean_quality.unwrap() - 0.8).abs() < 1e-9);
    assert!((for_a.mean_latency_ms.unwrap() - 2_000.0).abs() < 1e-9);
    assert_eq!(for_a.rejection_rate, 0.0);

    let for_b = SegmentRollupRepo::find(&pool, segment, b).await.unwrap().unwrap();
    assert_eq!(for_b.sample_count, 1);
    assert_eq!(for_b.rejection_rate, 1.0);

    let wide = SegmentRollupRepo::segment_wide(&pool, segment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wide.candidate_id, SEGMENT_WIDE_CANDIDATE_ID);
    assert_eq!(wide.sample_count, 3);
    assert!((wide.mean_quality.unwrap() - 0.7).abs() < 1e-9);
    assert!((wide.rejection_rate - 1.0 / 3.0).abs() < 1e-9);
}

#[sqlx::test(migrations = "./migrations")]
async fn rejected_outcomes_drag_the_rollup_down(pool: PgPool) {
    let good = seed_candidate(&pool, "steady").await;
    let bad = seed_candidate(&pool, "flaky").await;
    let segment = "support:us:api";

    for _ in 0..4 {
        seed_outcome(&pool, good, segment, Some(0.9), None, false).await;
        seed_outcome(&pool, bad, segment, Some(0.9), None, true).await;
    }
    SegmentRollupRepo::refresh(&pool, window_start()).await.unwrap();

    let good_row = SegmentRollupRepo::find(&pool, segment, good).await.unwrap().unwrap();
    let bad_row = SegmentRollupRepo::find(&pool, segment, bad).await.unwrap().unwrap();
    assert!(bad_row.rejection_rate > good_row.rejection_rate);
    assert_eq!(bad_row.snapshot().stability, Some(0.0));
    assert_eq!(good_row.snapshot().stability, Some(1.0));
}

#[sqlx::test(migrations = "./migrations")]
async fn outcomes_outside_the_window_are_ignored(pool: PgPool) {
    let a = seed_candidate(&pool, "swift-1").await;
    let segment = "marketing:eu:web";
    let stale = seed_outcome(&pool, a, segment, Some(0.1), None, true).await;
    seed_outcome(&pool, a, segment, Some(0.9), None, false).await;

    sqlx::query("UPDATE outcomes SET created_at = NOW() - INTERVAL '25 hours' WHERE id = $1")
        .bind(stale)
        .execute(&pool)
        .await
        .unwrap();

    SegmentRollupRepo::refresh(&pool, window_start()).await.unwrap();

    let row = SegmentRollupRepo::find(&pool, segment, a).await.unwrap().unwrap();
    assert_eq!(row.sample_count, 1);
    assert!((row.mean_quality.unwrap() - 0.9).abs() < 1e-9);
    assert_eq!(row.rejection_rate, 0.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn refresh_rewrites_stale_segments_away(pool: PgPool) {
    let a = seed_candidate(&pool, "swift-1").await;
    let stale = seed_outcome(&pool, a, "old:segment:key", Some(0.5), None, false).await;
    SegmentRollupRepo::refresh(&pool, window_start()).await.unwrap();
    assert!(SegmentRollupRepo::segment_wide(&pool, "old:segment:key")
        .await
        .unwrap()
        .is_some());

    sqlx::query("UPDATE outcomes SET created_at = NOW() - INTERVAL '25 hours' WHERE id = $1")
        .bind(stale)
        .execute(&pool)
        .await
        .unwrap();

    SegmentRollupRepo::refresh(&pool, window_start()).await.unwrap();
    assert!(
        SegmentRollupRepo::segment_wide(&pool, "old:segment:key")
            .await
            .unwrap()
            .is_none(),
        "segments with no in-window samples disappear on rewrite"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn candidate_snapshots_follow_outcomes(pool: PgPool) {
    let a = seed_candidate(&pool, "swift-1").await;
    let segment = "marketing:eu:web";
    seed_outcome(&pool, a, segment, Some(0.9), None, false).await;
    seed_outcome(&pool, a, segment, Some(0.7), None, true).await;

    let touched = CandidateRepo::refresh_snapshots(&pool, window_start()).await.unwrap();
    assert_eq!(touched, 1);

    let refreshed = CandidateRepo::find_by_id(&pool, a).await.unwrap().unwrap();
    assert!((refreshed.quality_score.unwrap() - 0.8).abs() < 1e-9);
    assert!((refreshed.stability_score.unwrap() - 0.5).abs() < 1e-9);
}
