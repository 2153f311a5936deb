//! Two-pass rank orchestration.
//!
//! [`RankOrchestrator`] owns one rank request end to end: validate, replay
//! idempotent hits, load and filter the pool, coarse pass, fine pass under
//! the deadline budget, exploration draw, then the atomically persisted
//! decision. The orchestrator is stateless; everything shared lives in
//! PostgreSQL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::PgPool;

use modelpick_core::candidate::CandidateProfile;
use modelpick_core::coarse::{self, CoarseRanked};
use modelpick_core::estimate;
use modelpick_core::explore::{self, clamp_epsilon, ExploreInputs};
use modelpick_core::features::SegmentSnapshot;
use modelpick_core::fine::{self, FineRanked};
use modelpick_core::filters::apply_hard_filters;
use modelpick_core::types::DbId;
use modelpick_core::weights::{CoarseWeights, FineWeights, WEIGHTS_VERSION};
use modelpick_db::models::decision::{Decision, NewDecision, SnapshotEntry};
use modelpick_db::repositories::{CandidateRepo, DecisionRepo, SegmentRollupRepo};

use crate::config::EngineConfig;
use crate::epsilon;
use crate::error::EngineError;
use crate::feature_store::FeatureStore;
use crate::health::{BreakerSet, HealthGuard};
use crate::request::RankRequest;
use crate::response::{RankResponse, RankedCandidate, Timings, Warning};

/// Identifies the ranking strategy in decision rows and responses.
pub const STRATEGY_VERSION: &str = "two-stage-v1";

/// How many next-best entries ride along as alternates.
const ALTERNATE_COUNT: usize = 2;

// ---------------------------------------------------------------------------
// Internal ranked form
// ---------------------------------------------------------------------------

/// One entry of the final order, with the expectations the decision row
/// stores. Fallback entries carry no scores.
#[derive(Debug, Clone)]
struct RankedEntry {
    candidate_id: DbId,
    provider: String,
    name: String,
    coarse_score: Option<f64>,
    fine_score: Option<f64>,
    expected_cost: f64,
    expected_latency_ms: f64,
}

impl RankedEntry {
    fn snapshot_entry(&self) -> SnapshotEntry {
        SnapshotEntry {
            candidate_id: self.candidate_id,
            provider: self.provider.clone(),
            name: self.name.clone(),
            coarse_score: self.coarse_score,
            fine_score: self.fine_score,
            expected_cost: Some(self.expected_cost),
            expected_latency_ms: Some(self.expected_latency_ms),
        }
    }

    fn response_entry(&self) -> RankedCandidate {
        RankedCandidate {
            candidate_id: self.candidate_id,
            provider: self.provider.clone(),
            name: self.name.clone(),
            coarse_score: self.coarse_score,
            fine_score: self.fine_score,
            expected_cost: Some(self.expected_cost),
            expected_latency_ms: Some(self.expected_latency_ms),
        }
    }
}

/// Everything the fine pass resolved from segment state.
struct FinePhase {
    entries: Vec<RankedEntry>,
    segment_quality: Option<f64>,
    rejection_rate: Option<f64>,
    epsilon: f64,
    degraded: bool,
}

fn coarse_only_entries(survivors: &[CoarseRanked], total_tokens: i64) -> Vec<RankedEntry> {
    survivors
        .iter()
        .map(|entry| RankedEntry {
            candidate_id: entry.profile.id,
            provider: entry.profile.provider.clone(),
            name: entry.profile.name.clone(),
            coarse_score: Some(entry.score),
            fine_score: None,
            expected_cost: estimate::estimated_cost(&entry.profile, total_tokens),
            expected_latency_ms: estimate::DEFAULT_EXPECTED_LATENCY_MS,
        })
        .collect()
}

/// The first `ALTERNATE_COUNT` entries in rank order, skipping the chosen.
fn pick_alternates(candidates: &[RankedCandidate], chosen_index: usize) -> Vec<RankedCandidate> {
    candidates
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != chosen_index)
        .take(ALTERNATE_COUNT)
        .map(|(_, candidate)| candidate.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// RankOrchestrator
// ---------------------------------------------------------------------------

/// Request-scoped ranking service.
#[derive(Clone)]
pub struct RankOrchestrator {
    pool: PgPool,
    config: EngineConfig,
    guard: HealthGuard,
    feature_store: Arc<dyn FeatureStore>,
}

impl RankOrchestrator {
    pub fn new(pool: PgPool, config: EngineConfig, feature_store: Arc<dyn FeatureStore>) -> Self {
        let guard = HealthGuard::new(pool.clone(), config.clone());
        Self {
            pool,
            config,
            guard,
            feature_store,
        }
    }

    /// Rank with a fresh OS-seeded generator.
    pub async fn rank(&self, request: RankRequest) -> Result<RankResponse, EngineError> {
        let mut rng = StdRng::from_os_rng();
        self.rank_with_rng(request, &mut rng).await
    }

    /// Rank with a caller-supplied generator. Tests pin the exploration
    /// draw this way.
    pub async fn rank_with_rng<R>(
        &self,
        request: RankRequest,
        rng: &mut R,
    ) -> Result<RankResponse, EngineError>
    where
        R: Rng + Send + ?Sized,
    {
        let started = Instant::now();
        request.validate()?;

        let segment_key = request.segment_key();
        let deadline = Duration::from_millis(
            request
                .options
                .deadline_ms
                .unwrap_or(self.config.default_deadline_ms),
        );

        if let Some(request_id) = request.options.request_id.as_deref() {
            if let Some(decision) =
                DecisionRepo::find_by_request_id(&self.pool, request_id).await?
            {
                tracing::debug!(
                    request_id,
                    decision_id = decision.id,
                    "Idempotent hit, replaying stored decision"
                );
                return self.replay(decision, started).await;
            }
        }

        let features = self.lookup_features(&request).await;
        let style_tags = coarse::merge_style_tags(&request.task, features.as_ref());
        let required_tokens = estimate::required_tokens(features.as_ref());
        let total_tokens = estimate::expected_total_tokens(features.as_ref());

        let breakers = self.guard.load_open().await?;
        let pool = self.load_pool(&breakers).await?;
        let pool_len = pool.len();
        let filtered =
            apply_hard_filters(pool, &request.task, &request.constraints, total_tokens);
        tracing::debug!(
            segment_key,
            pool = pool_len,
            survivors = filtered.len(),
            "Pool filtered"
        );

        let mut warnings = Vec::new();
        let mut timings = Timings::default();

        if filtered.is_empty() {
            return self
                .fallback(&request, &segment_key, total_tokens, warnings, timings, started)
                .await;
        }

        let coarse_started = Instant::now();
        let coarse_weights = CoarseWeights::default();
        let survivors = coarse::coarse_rank(
            filtered,
            &request.task,
            &style_tags,
            required_tokens,
            &coarse_weights,
            request.options.effective_top_k(),
        );
        timings.coarse_ms = coarse_started.elapsed().as_millis() as u64;

        let fine_weights = FineWeights::biased_for(&request.context);
        let fine_started = Instant::now();
        let budget = deadline.saturating_sub(started.elapsed());
        let fine = tokio::time::timeout(
            budget,
            self.fine_phase(
                &segment_key,
                &survivors,
                total_tokens,
                &fine_weights,
                request.constraints.max_latency_ms,
            ),
        )
        .await;
        timings.fine_ms = fine_started.elapsed().as_millis() as u64;

        let (entries, segment_quality, rejection_rate, epsilon) = match fine {
            Ok(phase) => {
                if phase.degraded {
                    warnings.push(Warning::MetricsDegraded);
                }
                if phase.entries.is_empty() {
                    // max_latency_ms dropped every survivor.
                    return self
                        .fallback(&request, &segment_key, total_tokens, warnings, timings, started)
                        .await;
                }
                (
                    phase.entries,
                    phase.segment_quality,
                    phase.rejection_rate,
                    phase.epsilon,
                )
            }
            Err(_) => {
                tracing::warn!(
                    segment_key,
                    deadline_ms = deadline.as_millis() as u64,
                    "Fine pass missed the deadline; answering coarse-only"
                );
                warnings.push(Warning::CoarseOnly);
                let entries = coarse_only_entries(&survivors, total_tokens);
                (entries, None, None, clamp_epsilon(self.config.epsilon_default))
            }
        };

        let draw = explore::decide(
            &ExploreInputs {
                enabled: request.options.explore,
                epsilon,
                segment_quality,
                rejection_rate,
                pool_len: entries.len(),
            },
            rng,
        );
        tracing::debug!(
            segment_key,
            explored = draw.explored,
            gate = draw.gate.as_str(),
            epsilon = draw.epsilon,
            "Exploration draw"
        );

        let decision = match self
            .persist(&request, &segment_key, &entries, draw.index, draw.explored, false)
            .await?
        {
            Some(decision) => decision,
            // Lost the idempotency race to a concurrent duplicate.
            None => return self.replay_request_id(&request, started).await,
        };

        if !draw.explored {
            if let Err(e) = self
                .guard
                .lkg_record(&segment_key, decision.chosen_candidate_id)
                .await
            {
                tracing::warn!(segment_key, error = %e, "Failed to record LKG entry");
            }
        }

        tracing::info!(
            decision_id = decision.id,
            segment_key = %decision.segment_key,
            chosen_candidate_id = decision.chosen_candidate_id,
            explored = decision.explored,
            "Decision persisted"
        );

        timings.total_ms = started.elapsed().as_millis() as u64;
        Ok(Self::respond(decision, &entries, draw.index, warnings, timings))
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    /// Resolve task features; a miss or store failure ranks with defaults.
    async fn lookup_features(
        &self,
        request: &RankRequest,
    ) -> Option<modelpick_core::task::TaskFeatures> {
        let subject_ref = request.task.subject_ref.as_deref()?;
        match self.feature_store.get_features_by_ref(subject_ref).await {
            Ok(features) => features,
            Err(e) => {
                tracing::warn!(
                    subject_ref,
                    error = %e,
                    "Feature store lookup failed; ranking without task features"
                );
                None
            }
        }
    }

    /// Active candidates minus open breakers, flattened into profiles.
    /// Rows with unreadable capabilities are skipped, not fatal.
    async fn load_pool(&self, breakers: &BreakerSet) -> Result<Vec<CandidateProfile>, EngineError> {
        let candidates = CandidateRepo::list_active(&self.pool).await?;
        let mut pool = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if breakers.blocks(&candidate.provider, candidate.id) {
                continue;
            }
            match candidate.to_profile() {
                Ok(profile) => pool.push(profile),
                Err(e) => {
                    tracing::warn!(
                        candidate_id = candidate.id,
                        error = %e,
                        "Skipping candidate with unreadable capabilities"
                    );
                }
            }
        }
        Ok(pool)
    }

    /// Fine pass: per-candidate rollup lookups run concurrently and merge
    /// back in coarse order. Failed lookups degrade that candidate to
    /// default snapshots instead of failing the request.
    async fn fine_phase(
        &self,
        segment_key: &str,
        survivors: &[CoarseRanked],
        total_tokens: i64,
        weights: &FineWeights,
        max_latency_ms: Option<f64>,
    ) -> FinePhase {
        let lookups = survivors.iter().map(|entry| {
            let candidate_id = entry.profile.id;
            async move {
                let result = SegmentRollupRepo::find(&self.pool, segment_key, candidate_id).await;
                (candidate_id, result)
            }
        });

        let (rollups, segment_wide, epsilon) = tokio::join!(
            join_all(lookups),
            SegmentRollupRepo::segment_wide(&self.pool, segment_key),
            epsilon::epsilon_for_segment(&self.pool, segment_key, self.config.epsilon_default),
        );

        let mut degraded = false;

        let mut snapshots: HashMap<DbId, SegmentSnapshot> = HashMap::new();
        for (candidate_id, result) in rollups {
            match result {
                Ok(Some(rollup)) => {
                    snapshots.insert(candidate_id, rollup.snapshot());
                }
                Ok(None) => {}
                Err(e) => {
                    degraded = true;
                    tracing::warn!(
                        segment_key,
                        candidate_id,
                        error = %e,
                        "Rollup lookup failed; scoring with defaults"
                    );
                }
            }
        }

        let items: Vec<FineRanked> = survivors
            .iter()
            .map(|entry| {
                let snapshot = snapshots.remove(&entry.profile.id).unwrap_or_default();
                let cost = estimate::estimated_cost(&entry.profile, total_tokens);
                FineRanked::build(entry.clone(), snapshot, cost, weights)
            })
            .collect();

        let mut items = fine::rank_fine(items);
        if let Some(max_latency) = max_latency_ms {
            items = fine::drop_over_latency(items, max_latency);
        }

        let (segment_quality, rejection_rate) = match segment_wide {
            Ok(Some(rollup)) if rollup.sample_count > 0 => {
                (rollup.mean_quality, Some(rollup.rejection_rate))
            }
            Ok(_) => (None, None),
            Err(e) => {
                degraded = true;
                tracing::warn!(segment_key, error = %e, "Segment-wide rollup lookup failed");
                (None, None)
            }
        };

        let epsilon = epsilon.unwrap_or_else(|e| {
            tracing::warn!(segment_key, error = %e, "Epsilon lookup failed; using the default");
            clamp_epsilon(self.config.epsilon_default)
        });

        let entries = items
            .iter()
            .map(|item| RankedEntry {
                candidate_id: item.profile.id,
                provider: item.profile.provider.clone(),
                name: item.profile.name.clone(),
                coarse_score: Some(item.coarse_score),
                fine_score: Some(item.fine_score),
                expected_cost: item.estimated_cost,
                expected_latency_ms: estimate::expected_latency_ms(&item.snapshot),
            })
            .collect();

        FinePhase {
            entries,
            segment_quality,
            rejection_rate,
            epsilon,
            degraded,
        }
    }

    /// Empty-pool path: answer with the segment's last-known-good pick if it
    /// is still active and unbroken, otherwise there is no candidate.
    async fn fallback(
        &self,
        request: &RankRequest,
        segment_key: &str,
        total_tokens: i64,
        mut warnings: Vec<Warning>,
        mut timings: Timings,
        started: Instant,
    ) -> Result<RankResponse, EngineError> {
        let no_candidate = || EngineError::NoCandidateAvailable {
            segment_key: segment_key.to_string(),
        };

        let Some(entry) = self.guard.lkg_get(segment_key).await? else {
            tracing::warn!(segment_key, "Empty pool and no valid LKG entry");
            return Err(no_candidate());
        };

        let Some(candidate) = CandidateRepo::find_by_id(&self.pool, entry.candidate_id).await?
        else {
            tracing::warn!(segment_key, candidate_id = entry.candidate_id, "LKG candidate vanished");
            return Err(no_candidate());
        };
        if !candidate.is_active() {
            tracing::warn!(segment_key, candidate_id = candidate.id, "LKG candidate is inactive");
            return Err(no_candidate());
        }
        if self.guard.is_open(&candidate.provider, candidate.id).await? {
            tracing::warn!(segment_key, candidate_id = candidate.id, "LKG candidate is circuit-broken");
            return Err(no_candidate());
        }
        let profile = match candidate.to_profile() {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(
                    segment_key,
                    candidate_id = candidate.id,
                    error = %e,
                    "LKG candidate has unreadable capabilities"
                );
                return Err(no_candidate());
            }
        };

        let expected_cost = estimate::estimated_cost(&profile, total_tokens);
        let entries = vec![RankedEntry {
            candidate_id: profile.id,
            provider: profile.provider,
            name: profile.name,
            coarse_score: None,
            fine_score: None,
            expected_cost,
            expected_latency_ms: estimate::DEFAULT_EXPECTED_LATENCY_MS,
        }];
        warnings.push(Warning::FallbackUsed);

        let decision = match self
            .persist(request, segment_key, &entries, 0, false, true)
            .await?
        {
            Some(decision) => decision,
            None => return self.replay_request_id(request, started).await,
        };

        tracing::info!(
            decision_id = decision.id,
            segment_key,
            chosen_candidate_id = decision.chosen_candidate_id,
            "Fallback decision persisted from LKG"
        );

        timings.total_ms = started.elapsed().as_millis() as u64;
        Ok(Self::respond(decision, &entries, 0, warnings, timings))
    }

    // -----------------------------------------------------------------------
    // Persistence and replay
    // -----------------------------------------------------------------------

    /// Persist snapshot plus decision atomically. `None` means a concurrent
    /// request already holds this request id.
    async fn persist(
        &self,
        request: &RankRequest,
        segment_key: &str,
        entries: &[RankedEntry],
        chosen_index: usize,
        explored: bool,
        fallback_used: bool,
    ) -> Result<Option<Decision>, EngineError> {
        let chosen = &entries[chosen_index];
        let new = NewDecision {
            request_id: request.options.request_id.clone(),
            chosen_candidate_id: chosen.candidate_id,
            segment_key: segment_key.to_string(),
            strategy_version: STRATEGY_VERSION,
            weights_version: WEIGHTS_VERSION,
            explored,
            fallback_used,
            coarse_score: chosen.coarse_score,
            fine_score: chosen.fine_score,
            expected_cost: chosen.expected_cost,
            expected_latency_ms: chosen.expected_latency_ms,
            task: serde_json::json!(request.task),
            context: serde_json::json!(request.context),
            constraints: serde_json::json!(request.constraints),
            entries: entries.iter().map(RankedEntry::snapshot_entry).collect(),
        };
        Ok(DecisionRepo::create_with_snapshot(&self.pool, &new).await?)
    }

    /// Replay the decision a concurrent duplicate just persisted.
    async fn replay_request_id(
        &self,
        request: &RankRequest,
        started: Instant,
    ) -> Result<RankResponse, EngineError> {
        let Some(request_id) = request.options.request_id.as_deref() else {
            return Err(EngineError::StoreUnavailable(sqlx::Error::RowNotFound));
        };
        let decision = DecisionRepo::find_by_request_id(&self.pool, request_id)
            .await?
            .ok_or(EngineError::StoreUnavailable(sqlx::Error::RowNotFound))?;
        tracing::debug!(
            request_id,
            decision_id = decision.id,
            "Concurrent duplicate, replaying the stored decision"
        );
        self.replay(decision, started).await
    }

    /// Rebuild a response from a stored decision and its snapshot.
    async fn replay(
        &self,
        decision: Decision,
        started: Instant,
    ) -> Result<RankResponse, EngineError> {
        let set = DecisionRepo::find_set(&self.pool, decision.candidate_set_id)
            .await?
            .ok_or(EngineError::StoreUnavailable(sqlx::Error::RowNotFound))?;
        let snapshot = set
            .decoded_entries()
            .map_err(|e| EngineError::StoreUnavailable(sqlx::Error::Decode(Box::new(e))))?;

        let candidates: Vec<RankedCandidate> =
            snapshot.iter().map(RankedCandidate::from).collect();
        let chosen_index = snapshot
            .iter()
            .position(|entry| entry.candidate_id == decision.chosen_candidate_id)
            .ok_or_else(|| {
                EngineError::StoreUnavailable(sqlx::Error::Decode(
                    "chosen candidate missing from stored snapshot".into(),
                ))
            })?;
        let chosen = candidates[chosen_index].clone();
        let alternates = pick_alternates(&candidates, chosen_index);

        let mut warnings = vec![Warning::IdempotentCacheHit];
        if decision.fallback_used {
            warnings.push(Warning::FallbackUsed);
        }

        let timings = Timings {
            coarse_ms: 0,
            fine_ms: 0,
            total_ms: started.elapsed().as_millis() as u64,
        };

        Ok(RankResponse {
            decision_id: decision.id,
            candidate_set_id: decision.candidate_set_id,
            segment_key: decision.segment_key,
            strategy_version: decision.strategy_version,
            weights_version: decision.weights_version,
            chosen,
            candidates,
            alternates,
            explored: decision.explored,
            fallback_used: decision.fallback_used,
            warnings,
            timings,
        })
    }

    fn respond(
        decision: Decision,
        entries: &[RankedEntry],
        chosen_index: usize,
        warnings: Vec<Warning>,
        timings: Timings,
    ) -> RankResponse {
        let candidates: Vec<RankedCandidate> =
            entries.iter().map(RankedEntry::response_entry).collect();
        let chosen = candidates[chosen_index].clone();
        let alternates = pick_alternates(&candidates, chosen_index);

        RankResponse {
            decision_id: decision.id,
            candidate_set_id: decision.candidate_set_id,
            segment_key: decision.segment_key,
            strategy_version: decision.strategy_version,
            weights_version: decision.weights_version,
            chosen,
            candidates,
            alternates,
            explored: decision.explored,
            fallback_used: decision.fallback_used,
            warnings,
            timings,
        }
    }
}
