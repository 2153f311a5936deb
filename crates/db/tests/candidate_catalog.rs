use sqlx::PgPool;

use modelpick_core::capabilities::Capabilities;
use modelpick_db::models::candidate::{CandidateStatus, UpsertCandidateInput};
use modelpick_db::repositories::CandidateRepo;

fn input(provider: &str, name: &str) -> UpsertCandidateInput {
    UpsertCandidateInput {
        provider: provider.to_string(),
        name: name.to_string(),
        version: "2026-01".to_string(),
        languages: vec!["en".to_string(), "pt-BR".to_string()],
        capabilities: Capabilities {
            json_mode: true,
            ..Capabilities::default()
        },
        context_window: 32_000,
        max_output_tokens: 4_000,
        unit_price_per_1k: 0.015,
        tags: vec!["marketing".to_string()],
        quality_score: None,
        stability_score: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn upsert_creates_then_updates_in_place(pool: PgPool) {
    let created = CandidateRepo::upsert(&pool, &input("acme", "swift-1"))
        .await
        .unwrap();
    assert_eq!(created.provider, "acme");
    assert_eq!(created.status, "active");

    let mut changed = input("acme", "swift-1");
    changed.unit_price_per_1k = 0.02;
    changed.tags = vec!["support".to_string()];
    let updated = CandidateRepo::upsert(&pool, &changed).await.unwrap();

    assert_eq!(updated.id, created.id, "same natural key keeps the row");
    assert_eq!(updated.unit_price_per_1k, 0.02);
    assert_eq!(updated.tags, vec!["support".to_string()]);
}

#[sqlx::test(migrations = "./migrations")]
async fn upsert_keeps_rolling_snapshot_unless_seeded(pool: PgPool) {
    let mut seeded = input("acme", "swift-1");
    seeded.quality_score = Some(0.9);
    let created = CandidateRepo::upsert(&pool, &seeded).await.unwrap();
    assert_eq!(created.quality_score, Some(0.9));

    // Re-posting without a seed must not wipe the snapshot.
    let updated = CandidateRepo::upsert(&pool, &input("acme", "swift-1"))
        .await
        .unwrap();
    assert_eq!(updated.quality_score, Some(0.9));
}

#[sqlx::test(migrations = "./migrations")]
async fn capabilities_round_trip_through_jsonb(pool: PgPool) {
    let created = CandidateRepo::upsert(&pool, &input("acme", "swift-1"))
        .await
        .unwrap();
    let profile = created.to_profile().unwrap();
    assert!(profile.capabilities.json_mode);
    assert!(!profile.capabilities.vision);
}

#[sqlx::test(migrations = "./migrations")]
async fn list_active_excludes_deactivated(pool: PgPool) {
    let a = CandidateRepo::upsert(&pool, &input("acme", "swift-1"))
        .await
        .unwrap();
    let b = CandidateRepo::upsert(&pool, &input("acme", "swift-2"))
        .await
        .unwrap();

    CandidateRepo::set_status(&pool, a.id, CandidateStatus::Inactive)
        .await
        .unwrap()
        .unwrap();

    let active = CandidateRepo::list_active(&pool).await.unwrap();
    let ids: Vec<_> = active.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![b.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn reactivation_restores_pool_membership(pool: PgPool) {
    let a = CandidateRepo::upsert(&pool, &input("acme", "swift-1"))
        .await
        .unwrap();
    CandidateRepo::set_status(&pool, a.id, CandidateStatus::Inactive)
        .await
        .unwrap()
        .unwrap();
    CandidateRepo::set_status(&pool, a.id, CandidateStatus::Active)
        .await
        .unwrap()
        .unwrap();

    let active = CandidateRepo::list_active(&pool).await.unwrap();
    assert_eq!(active.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn set_status_on_missing_row_returns_none(pool: PgPool) {
    let missing = CandidateRepo::set_status(&pool, 9_999, CandidateStatus::Inactive)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn list_filters_by_status(pool: PgPool) {
    let a = CandidateRepo::upsert(&pool, &input("acme", "swift-1"))
        .await
        .unwrap();
    CandidateRepo::upsert(&pool, &input("acme", "swift-2"))
        .await
        .unwrap();
    CandidateRepo::set_status(&pool, a.id, CandidateStatus::Inactive)
        .await
        .unwrap()
        .unwrap();

    let inactive = CandidateRepo::list(&pool, Some(CandidateStatus::Inactive), 50, 0)
        .await
        .unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].id, a.id);

    let all = CandidateRepo::list(&pool, None, 50, 0).await.unwrap();
    assert_eq!(all.len(), 2);
}
