//! Collaborator traits for the catalog and record stores.
//!
//! Both collaborators are external systems. The traits here describe exactly
//! what this core consumes: read-only catalog access, and record access
//! limited to profile/plan reads, a single narrow plan write, and append-only
//! feedback. The in-memory implementations back tests and single-process
//! deployments behind the same interface.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{PlanId, ResourceId, SkillId, UserId};
use crate::types::{
    DevelopmentPlan, Feedback, PlanResource, PlanStatus, Resource, Skill, UserSkillProfile,
};

/// Failure talking to a backing store.
///
/// Store errors surface to callers as a service-unavailable condition; they
/// are never silently swallowed on the request path.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    #[error("no such record: {0}")]
    Missing(String),
    #[error("malformed record: {0}")]
    Malformed(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only source of skills and resources.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn skill(&self, id: &SkillId) -> StoreResult<Option<Skill>>;

    async fn skills(&self) -> StoreResult<Vec<Skill>>;

    async fn skills_in_category(&self, category: &str) -> StoreResult<Vec<Skill>>;

    async fn resource(&self, id: &ResourceId) -> StoreResult<Option<Resource>>;

    async fn resources(&self) -> StoreResult<Vec<Resource>>;
}

/// Read/write source of profiles, plans, and feedback.
///
/// Plan writes are limited to `recommended_resources` and `status`; feedback
/// is append-only. Concurrent writers to one plan race with last-write-wins
/// semantics at the record level.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn profile(&self, user: &UserId) -> StoreResult<Option<UserSkillProfile>>;

    async fn profiles(&self) -> StoreResult<Vec<UserSkillProfile>>;

    async fn plan(&self, id: &PlanId) -> StoreResult<Option<DevelopmentPlan>>;

    /// Plans currently in any of the given states.
    async fn plans_with_status(
        &self,
        statuses: &[PlanStatus],
    ) -> StoreResult<Vec<DevelopmentPlan>>;

    /// Replace a plan's recommended resources wholesale and move it to
    /// `status`. The only plan mutation this side ever performs.
    async fn update_plan_outcome(
        &self,
        id: &PlanId,
        resources: Vec<PlanResource>,
        status: PlanStatus,
    ) -> StoreResult<()>;

    async fn append_feedback(&self, feedback: Feedback) -> StoreResult<()>;
}

/// Snapshot of the full catalog, the shape memoized through the cache layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub skills: Vec<Skill>,
    pub resources: Vec<Resource>,
}

impl CatalogSnapshot {
    /// Load a fresh snapshot from the catalog collaborator.
    pub async fn load(catalog: &dyn CatalogStore) -> StoreResult<Self> {
        Ok(Self {
            skills: catalog.skills().await?,
            resources: catalog.resources().await?,
        })
    }
}

/// In-memory catalog. Listing methods return entries sorted by id so that
/// downstream computations see a stable ordering.
#[derive(Default)]
pub struct MemoryCatalog {
    skills: RwLock<HashMap<SkillId, Skill>>,
    resources: RwLock<HashMap<ResourceId, Resource>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_skill(&self, skill: Skill) {
        self.skills.write().insert(skill.id.clone(), skill);
    }

    pub fn insert_resource(&self, resource: Resource) {
        self.resources.write().insert(resource.id.clone(), resource);
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn skill(&self, id: &SkillId) -> StoreResult<Option<Skill>> {
        Ok(self.skills.read().get(id).cloned())
    }

    async fn skills(&self) -> StoreResult<Vec<Skill>> {
        let mut all: Vec<Skill> = self.skills.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn skills_in_category(&self, category: &str) -> StoreResult<Vec<Skill>> {
        let mut matched: Vec<Skill> = self
            .skills
            .read()
            .values()
            .filter(|s| s.category == category)
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matched)
    }

    async fn resource(&self, id: &ResourceId) -> StoreResult<Option<Resource>> {
        Ok(self.resources.read().get(id).cloned())
    }

    async fn resources(&self) -> StoreResult<Vec<Resource>> {
        let mut all: Vec<Resource> = self.resources.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

/// In-memory record store.
#[derive(Default)]
pub struct MemoryRecords {
    profiles: RwLock<HashMap<UserId, UserSkillProfile>>,
    plans: RwLock<HashMap<PlanId, DevelopmentPlan>>,
    feedback: RwLock<Vec<Feedback>>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_profile(&self, profile: UserSkillProfile) {
        self.profiles.write().insert(profile.user_id.clone(), profile);
    }

    pub fn insert_plan(&self, plan: DevelopmentPlan) {
        self.plans.write().insert(plan.id.clone(), plan);
    }

    /// All feedback recorded so far, oldest first. Test observability.
    pub fn feedback_log(&self) -> Vec<Feedback> {
        self.feedback.read().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecords {
    async fn profile(&self, user: &UserId) -> StoreResult<Option<UserSkillProfile>> {
        Ok(self.profiles.read().get(user).cloned())
    }

    async fn profiles(&self) -> StoreResult<Vec<UserSkillProfile>> {
        let mut all: Vec<UserSkillProfile> = self.profiles.read().values().cloned().collect();
        all.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(all)
    }

    async fn plan(&self, id: &PlanId) -> StoreResult<Option<DevelopmentPlan>> {
        Ok(self.plans.read().get(id).cloned())
    }

    async fn plans_with_status(
        &self,
        statuses: &[PlanStatus],
    ) -> StoreResult<Vec<DevelopmentPlan>> {
        let mut matched: Vec<DevelopmentPlan> = self
            .plans
            .read()
            .values()
            .filter(|p| statuses.contains(&p.status))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matched)
    }

    async fn update_plan_outcome(
        &self,
        id: &PlanId,
        resources: Vec<PlanResource>,
        status: PlanStatus,
    ) -> StoreResult<()> {
        let mut plans = self.plans.write();
        let plan = plans
            .get_mut(id)
            .ok_or_else(|| StoreError::Missing(format!("plan {id}")))?;
        plan.recommended_resources = resources;
        plan.status = status;
        Ok(())
    }

    async fn append_feedback(&self, feedback: Feedback) -> StoreResult<()> {
        self.feedback.write().push(feedback);
        Ok(())
    }
}
