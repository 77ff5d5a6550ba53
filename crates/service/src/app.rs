//! Application facade and component lifecycle.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uplevel_cache::{get_or_compute, keys, CacheStore, MemoryCache, RemoteCache, Sweeper};
use uplevel_catalog::{
    CatalogSnapshot, CatalogStore, Feedback, FeedbackAction, PlanId, PlanStatus, RecordStore,
    ResourceId, SkillId, StoreError, UserId,
};
use uplevel_engine::{aggregate, compute, EngineConfig, PeerUsageMap};
use uplevel_queue::{Job, JobId, JobTrigger, LocalTrigger, RecommendationJob, RemoteTrigger, RunnerContext};

use crate::api::{
    validate_targets, FeedbackAck, FeedbackRequest, Recommendation, SimilarSkillsRequest,
    SimilarSkillsResponse, SuggestionRequest, SuggestionResponse,
};
use crate::config::{CacheBackend, Config, QueueBackend};
use crate::error::ServiceError;

/// Core application facade.
///
/// Owns the collaborator handles, the cache, the job trigger, and the engine
/// configuration. Constructed explicitly at startup and torn down with
/// [`App::shutdown`]; there are no process-global singletons, and because
/// cached/queued data is intentionally non-durable a process restart is
/// always safe.
pub struct App {
    catalog: Arc<dyn CatalogStore>,
    records: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheStore>,
    trigger: Arc<dyn JobTrigger>,
    engine: EngineConfig,
    sweeper: Sweeper,
    local_worker: Option<Arc<LocalTrigger>>,
}

impl App {
    /// Assemble the application from configuration and collaborator handles.
    ///
    /// Must be called within a tokio runtime: the cache sweeper (and, for
    /// the local queue backend, the job worker) are spawned here.
    pub fn new(
        config: &Config,
        catalog: Arc<dyn CatalogStore>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        let cache: Arc<dyn CacheStore> = match (config.cache.backend, &config.cache.url) {
            (CacheBackend::Remote, Some(url)) => {
                Arc::new(RemoteCache::with_default_ttl(url, config.cache.default_ttl()))
            }
            _ => Arc::new(MemoryCache::with_default_ttl(config.cache.default_ttl())),
        };
        let engine = config.engine_config();

        let ctx = RunnerContext {
            catalog: Arc::clone(&catalog),
            records: Arc::clone(&records),
            cache: Arc::clone(&cache),
            engine: engine.clone(),
        };
        let (trigger, local_worker): (Arc<dyn JobTrigger>, Option<Arc<LocalTrigger>>) =
            match (config.queue.backend, &config.queue.url) {
                (QueueBackend::Remote, Some(url)) => (Arc::new(RemoteTrigger::new(url)), None),
                _ => {
                    let local = Arc::new(LocalTrigger::spawn(ctx));
                    (Arc::clone(&local) as Arc<dyn JobTrigger>, Some(local))
                }
            };

        let sweeper = Sweeper::spawn(Arc::clone(&cache), config.cache.sweep_interval());

        Self {
            catalog,
            records,
            cache,
            trigger,
            engine,
            sweeper,
            local_worker,
        }
    }

    /// Tear down background tasks (cache sweeper, local queue worker).
    pub fn shutdown(&self) {
        self.sweeper.stop();
        if let Some(worker) = &self.local_worker {
            worker.shutdown();
        }
        tracing::info!(target: "uplevel::service", "background tasks stopped");
    }

    /// The cache handle, mainly for observability and tests.
    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Compute ranked suggestions for a user, synchronously on the request
    /// path.
    pub async fn suggestions(
        &self,
        user_id: &str,
        request: SuggestionRequest,
    ) -> Result<SuggestionResponse, ServiceError> {
        let user = parse_user(user_id)?;
        let targets = validate_targets(&request)?;

        let profile = self
            .records
            .profile(&user)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;

        let snapshot = self.catalog_snapshot().await?;
        let known: HashSet<&SkillId> = snapshot.skills.iter().map(|s| &s.id).collect();
        for target in &targets {
            if !known.contains(&target.skill_id) {
                return Err(ServiceError::NotFound("skill"));
            }
        }

        let peers = self.peer_map(&user).await?;
        // An empty peer map carries no signal; skip the blend entirely.
        let peers = (!peers.is_empty()).then_some(&peers);

        let ranked = compute(
            &targets,
            &profile,
            &snapshot.resources,
            &snapshot.skills,
            peers,
            &self.engine,
        );

        Ok(SuggestionResponse {
            recommendations: ranked.into_iter().map(Recommendation::from).collect(),
        })
    }

    /// Append a feedback record for a resource.
    ///
    /// Recording failures are logged and never fail the enclosing request
    /// flow; the acknowledgment reports whether the append landed.
    pub async fn record_feedback(
        &self,
        user_id: &str,
        request: FeedbackRequest,
    ) -> Result<FeedbackAck, ServiceError> {
        let user = parse_user(user_id)?;
        let resource_id = ResourceId::parse(&request.resource_id)
            .map_err(|e| ServiceError::validation(e.to_string()))?;
        let action = FeedbackAction::parse(&request.action).ok_or_else(|| {
            ServiceError::validation(format!("unknown feedback action: {}", request.action))
        })?;

        if self.catalog.resource(&resource_id).await?.is_none() {
            return Err(ServiceError::NotFound("resource"));
        }

        let feedback = Feedback {
            user_id: user.clone(),
            resource_id,
            action,
            timestamp: Utc::now(),
        };
        if let Err(error) = self.records.append_feedback(feedback).await {
            tracing::error!(
                target: "uplevel::service",
                user = %user,
                %error,
                "failed to record feedback"
            );
            return Ok(FeedbackAck { recorded: false });
        }
        Ok(FeedbackAck { recorded: true })
    }

    /// Skills in the same category as the queried skill, ordered by name
    /// similarity.
    pub async fn similar_skills(
        &self,
        request: SimilarSkillsRequest,
    ) -> Result<SimilarSkillsResponse, ServiceError> {
        let skill_id = SkillId::parse(&request.skill_id)
            .map_err(|e| ServiceError::validation(e.to_string()))?;
        let skill = self
            .catalog
            .skill(&skill_id)
            .await?
            .ok_or(ServiceError::NotFound("skill"))?;
        let pool = self.catalog.skills_in_category(&skill.category).await?;
        Ok(SimilarSkillsResponse {
            similar_skills: uplevel_engine::similar_skills(&skill, &pool),
        })
    }

    /// Enqueue a recommendation recomputation for a plan.
    ///
    /// Returns as soon as the job is accepted. Acceptance is not a promise
    /// of completion: the job may still fail out of band (including on a
    /// plan that does not exist), in which case the failure is logged and
    /// the plan is left unchanged.
    pub async fn trigger_plan_refresh(
        &self,
        user_id: &str,
        plan_id: &str,
    ) -> Result<JobId, ServiceError> {
        let user = parse_user(user_id)?;
        let plan =
            PlanId::parse(plan_id).map_err(|e| ServiceError::validation(e.to_string()))?;

        let job = Job::new(RecommendationJob {
            user_id: user,
            plan_id: plan,
        });
        let id = job.id;
        self.trigger.enqueue(job).await;
        Ok(id)
    }

    /// Full catalog snapshot, memoized through the cache layer.
    async fn catalog_snapshot(&self) -> Result<CatalogSnapshot, StoreError> {
        get_or_compute(
            self.cache.as_ref(),
            keys::CATALOG_SNAPSHOT,
            None,
            || async { CatalogSnapshot::load(self.catalog.as_ref()).await },
        )
        .await
    }

    /// Peer usage map for `user`, memoized through the cache layer.
    async fn peer_map(&self, user: &UserId) -> Result<PeerUsageMap, StoreError> {
        get_or_compute(
            self.cache.as_ref(),
            &keys::peer_map(user.as_str()),
            None,
            || async {
                let profiles = self.records.profiles().await?;
                let plans = self
                    .records
                    .plans_with_status(&[PlanStatus::Approved, PlanStatus::Completed])
                    .await?;
                Ok(aggregate(user, &profiles, &plans))
            },
        )
        .await
    }
}

fn parse_user(raw: &str) -> Result<UserId, ServiceError> {
    UserId::parse(raw).map_err(|e| ServiceError::validation(e.to_string()))
}
