//! Recommendation job execution.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use uplevel_cache::{get_or_compute, keys, CacheStore};
use uplevel_catalog::{
    CatalogSnapshot, CatalogStore, PlanResource, PlanStatus, RecordStore, StoreError, UserId,
};
use uplevel_engine::{aggregate, compute, EngineConfig, PeerUsageMap};

use crate::RecommendationJob;

/// Shared handles a job runner needs. Cloned into each worker.
#[derive(Clone)]
pub struct RunnerContext {
    pub catalog: Arc<dyn CatalogStore>,
    pub records: Arc<dyn RecordStore>,
    pub cache: Arc<dyn CacheStore>,
    pub engine: EngineConfig,
}

/// Execute one recommendation job.
///
/// On success the plan's `recommended_resources` list is replaced wholesale
/// (any prior entries, curated or not, are discarded) and the plan moves to
/// `Active`, both in a single record-store write. On failure at any step the
/// plan is left completely unchanged; the error is returned for the trigger
/// to log, never to retry.
pub async fn run_recommendation(ctx: &RunnerContext, job: &RecommendationJob) -> Result<()> {
    let plan = ctx
        .records
        .plan(&job.plan_id)
        .await
        .context("loading development plan")?
        .ok_or_else(|| anyhow!("plan {} not found", job.plan_id))?;

    let profile = ctx
        .records
        .profile(&job.user_id)
        .await
        .context("loading user skill profile")?
        .ok_or_else(|| anyhow!("user {} not found", job.user_id))?;

    if plan.status == PlanStatus::Completed {
        tracing::warn!(
            target: "uplevel::queue",
            plan = %plan.id,
            "plan already completed; leaving it untouched"
        );
        return Ok(());
    }

    if plan.skills_to_improve.is_empty() {
        tracing::info!(
            target: "uplevel::queue",
            plan = %plan.id,
            "plan has no target skills; skipping recommendation run"
        );
        return Ok(());
    }

    let snapshot: CatalogSnapshot =
        get_or_compute(ctx.cache.as_ref(), keys::CATALOG_SNAPSHOT, None, || async {
            CatalogSnapshot::load(ctx.catalog.as_ref()).await
        })
        .await
        .context("loading catalog snapshot")?;

    let peers = peer_map(ctx, &job.user_id)
        .await
        .context("aggregating peer usage")?;
    let peers = (!peers.is_empty()).then_some(&peers);

    let ranked = compute(
        &plan.skills_to_improve,
        &profile,
        &snapshot.resources,
        &snapshot.skills,
        peers,
        &ctx.engine,
    );

    let resources: Vec<PlanResource> = ranked
        .iter()
        .map(|r| PlanResource::recommended(r.resource_id.clone()))
        .collect();

    ctx.records
        .update_plan_outcome(&plan.id, resources, PlanStatus::Active)
        .await
        .context("persisting recommendation outcome")?;

    tracing::info!(
        target: "uplevel::queue",
        plan = %plan.id,
        user = %job.user_id,
        count = ranked.len(),
        "recommendations generated"
    );
    Ok(())
}

/// Peer usage map for `user`, memoized through the cache layer.
async fn peer_map(ctx: &RunnerContext, user: &UserId) -> Result<PeerUsageMap, StoreError> {
    get_or_compute(
        ctx.cache.as_ref(),
        &keys::peer_map(user.as_str()),
        None,
        || async {
            let profiles = ctx.records.profiles().await?;
            let plans = ctx
                .records
                .plans_with_status(&[PlanStatus::Approved, PlanStatus::Completed])
                .await?;
            Ok(aggregate(user, &profiles, &plans))
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use uplevel_cache::MemoryCache;
    use uplevel_catalog::{
        DevelopmentPlan, Difficulty, Feedback, MemoryCatalog, MemoryRecords, PlanId,
        RecommendationStatus, StoreResult, UserSkillProfile,
    };
    use uplevel_test_utils::{plan, profile, resource, resource_aged, skill};

    fn context() -> (Arc<MemoryCatalog>, Arc<MemoryRecords>, RunnerContext) {
        let catalog = Arc::new(MemoryCatalog::new());
        let records = Arc::new(MemoryRecords::new());
        let ctx = RunnerContext {
            catalog: Arc::clone(&catalog) as Arc<dyn CatalogStore>,
            records: Arc::clone(&records) as Arc<dyn RecordStore>,
            cache: Arc::new(MemoryCache::new()),
            engine: EngineConfig::default(),
        };
        (catalog, records, ctx)
    }

    fn job(user: &str, plan_id: &str) -> RecommendationJob {
        RecommendationJob {
            user_id: UserId::parse(user).unwrap(),
            plan_id: PlanId::parse(plan_id).unwrap(),
        }
    }

    fn seed_basic(catalog: &MemoryCatalog, records: &MemoryRecords) {
        catalog.insert_skill(skill("rust", "Rust", "backend"));
        catalog.insert_resource(resource("res-1", "rust", Some(Difficulty::Intermediate)));
        catalog.insert_resource(resource_aged(
            "res-2",
            "rust",
            Some(Difficulty::Beginner),
            2,
        ));
        records.insert_profile(profile("alice", &[("rust", 3)]));
        records.insert_plan(plan(
            "plan-1",
            "alice",
            PlanStatus::Approved,
            &[("rust", Some(5))],
            &["res-stale"],
        ));
    }

    #[tokio::test]
    async fn successful_run_replaces_resources_and_activates_plan() {
        let (catalog, records, ctx) = context();
        seed_basic(&catalog, &records);

        run_recommendation(&ctx, &job("alice", "plan-1")).await.unwrap();

        let updated = records
            .plan(&PlanId::parse("plan-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, PlanStatus::Active);
        let ids: Vec<&str> = updated
            .recommended_resources
            .iter()
            .map(|r| r.resource_id.as_str())
            .collect();
        // Prior entries are gone; fresh entries are pending and unverified.
        assert!(!ids.contains(&"res-stale"));
        assert_eq!(ids, vec!["res-1", "res-2"]);
        assert!(updated
            .recommended_resources
            .iter()
            .all(|r| r.status == RecommendationStatus::Pending && r.evidence.is_empty()));
    }

    #[tokio::test]
    async fn run_memoizes_catalog_and_peer_aggregates() {
        let (catalog, records, ctx) = context();
        seed_basic(&catalog, &records);

        run_recommendation(&ctx, &job("alice", "plan-1")).await.unwrap();

        assert!(ctx.cache.get(keys::CATALOG_SNAPSHOT).await.is_some());
        assert!(ctx.cache.get(&keys::peer_map("alice")).await.is_some());
    }

    #[tokio::test]
    async fn missing_plan_fails_without_writes() {
        let (catalog, records, ctx) = context();
        seed_basic(&catalog, &records);

        let result = run_recommendation(&ctx, &job("alice", "plan-ghost")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_profile_fails_and_leaves_plan_unchanged() {
        let (catalog, records, ctx) = context();
        seed_basic(&catalog, &records);

        let result = run_recommendation(&ctx, &job("nobody", "plan-1")).await;
        assert!(result.is_err());

        let untouched = records
            .plan(&PlanId::parse("plan-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.status, PlanStatus::Approved);
    }

    #[tokio::test]
    async fn empty_skill_list_skips_without_writes() {
        let (catalog, records, ctx) = context();
        catalog.insert_skill(skill("rust", "Rust", "backend"));
        records.insert_profile(profile("alice", &[("rust", 3)]));
        records.insert_plan(plan("plan-1", "alice", PlanStatus::Pending, &[], &["res-keep"]));

        run_recommendation(&ctx, &job("alice", "plan-1")).await.unwrap();

        let untouched = records
            .plan(&PlanId::parse("plan-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.status, PlanStatus::Pending);
        assert_eq!(untouched.recommended_resources.len(), 1);
    }

    #[tokio::test]
    async fn completed_plan_is_never_reactivated() {
        let (catalog, records, ctx) = context();
        seed_basic(&catalog, &records);
        records.insert_plan(plan(
            "plan-done",
            "alice",
            PlanStatus::Completed,
            &[("rust", Some(5))],
            &["res-kept"],
        ));

        run_recommendation(&ctx, &job("alice", "plan-done")).await.unwrap();

        let untouched = records
            .plan(&PlanId::parse("plan-done").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.status, PlanStatus::Completed);
        assert_eq!(untouched.recommended_resources.len(), 1);
    }

    /// Record store whose reads work but whose plan write always fails.
    struct ReadOnlyRecords {
        inner: Arc<MemoryRecords>,
    }

    #[async_trait]
    impl RecordStore for ReadOnlyRecords {
        async fn profile(&self, user: &UserId) -> StoreResult<Option<UserSkillProfile>> {
            self.inner.profile(user).await
        }

        async fn profiles(&self) -> StoreResult<Vec<UserSkillProfile>> {
            self.inner.profiles().await
        }

        async fn plan(&self, id: &PlanId) -> StoreResult<Option<DevelopmentPlan>> {
            self.inner.plan(id).await
        }

        async fn plans_with_status(
            &self,
            statuses: &[PlanStatus],
        ) -> StoreResult<Vec<DevelopmentPlan>> {
            self.inner.plans_with_status(statuses).await
        }

        async fn update_plan_outcome(
            &self,
            _id: &PlanId,
            _resources: Vec<PlanResource>,
            _status: PlanStatus,
        ) -> StoreResult<()> {
            Err(StoreError::Unavailable("write path down".to_string()))
        }

        async fn append_feedback(&self, feedback: Feedback) -> StoreResult<()> {
            self.inner.append_feedback(feedback).await
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_plan_completely_unchanged() {
        let catalog = Arc::new(MemoryCatalog::new());
        let inner = Arc::new(MemoryRecords::new());
        seed_basic(&catalog, &inner);

        let ctx = RunnerContext {
            catalog: Arc::clone(&catalog) as Arc<dyn CatalogStore>,
            records: Arc::new(ReadOnlyRecords {
                inner: Arc::clone(&inner),
            }),
            cache: Arc::new(MemoryCache::new()),
            engine: EngineConfig::default(),
        };

        let result = run_recommendation(&ctx, &job("alice", "plan-1")).await;
        assert!(result.is_err());

        let untouched = inner
            .plan(&PlanId::parse("plan-1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.status, PlanStatus::Approved);
        assert_eq!(untouched.recommended_resources.len(), 1);
        assert_eq!(
            untouched.recommended_resources[0].resource_id.as_str(),
            "res-stale"
        );
    }
}
