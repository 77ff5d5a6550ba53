//! Shared test utilities for uplevel crates.
//!
//! Provides env guards for tests that mutate process-global state, fixture
//! builders for catalog and record entities with fixed timestamps, and
//! collaborator stubs for exercising failure paths.

use std::sync::{LazyLock, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uplevel_catalog::{
    CatalogStore, DevelopmentPlan, Difficulty, Feedback, Level, PlanId, PlanResource, PlanStatus,
    RecordStore, Resource, ResourceId, Skill, SkillId, SkillRating, SkillTarget, StoreError,
    StoreResult, UserId, UserSkillProfile,
};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent races between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores the original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original
/// value on drop. Pass `None` to unset.
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Fixed timestamp shared by fixtures so orderings are deterministic.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

/// A skill fixture.
pub fn skill(id: &str, name: &str, category: &str) -> Skill {
    Skill {
        id: SkillId::parse(id).expect("valid skill id"),
        name: name.to_string(),
        category: category.to_string(),
    }
}

/// A resource fixture at the base timestamp.
pub fn resource(id: &str, skill_id: &str, difficulty: Option<Difficulty>) -> Resource {
    resource_aged(id, skill_id, difficulty, 0)
}

/// A resource fixture whose `updated_at` is `age_days` before the base
/// timestamp. Larger ages sort later in newest-first orderings.
pub fn resource_aged(
    id: &str,
    skill_id: &str,
    difficulty: Option<Difficulty>,
    age_days: i64,
) -> Resource {
    let at = base_time() - Duration::days(age_days);
    Resource {
        id: ResourceId::parse(id).expect("valid resource id"),
        title: format!("{id} title"),
        provider: "Acme Learning".to_string(),
        kind: "course".to_string(),
        skill_id: Some(SkillId::parse(skill_id).expect("valid skill id")),
        difficulty,
        target_level: None,
        created_at: at,
        updated_at: at,
    }
}

/// A skill rating fixture.
pub fn rating(skill_id: &str, level: u8) -> SkillRating {
    SkillRating {
        skill_id: SkillId::parse(skill_id).expect("valid skill id"),
        level: Level::new(level),
    }
}

/// A profile fixture from `(skill_id, level)` pairs.
pub fn profile(user_id: &str, ratings: &[(&str, u8)]) -> UserSkillProfile {
    UserSkillProfile {
        user_id: UserId::parse(user_id).expect("valid user id"),
        skills: ratings.iter().map(|(s, l)| rating(s, *l)).collect(),
    }
}

/// A development plan fixture. `targets` are `(skill_id, target_level)`
/// pairs (`None` leaves the level unspecified); `used` resource ids land in
/// `recommended_resources` as pending entries.
pub fn plan(
    id: &str,
    employee: &str,
    status: PlanStatus,
    targets: &[(&str, Option<u8>)],
    used: &[&str],
) -> DevelopmentPlan {
    DevelopmentPlan {
        id: PlanId::parse(id).expect("valid plan id"),
        employee_id: UserId::parse(employee).expect("valid user id"),
        skills_to_improve: targets
            .iter()
            .map(|(s, l)| SkillTarget {
                skill_id: SkillId::parse(s).expect("valid skill id"),
                target_level: l.map(Level::new),
            })
            .collect(),
        recommended_resources: used
            .iter()
            .map(|r| PlanResource::recommended(ResourceId::parse(r).expect("valid resource id")))
            .collect(),
        status,
    }
}

/// A record store that is always unreachable. Backs tests for the
/// service-unavailable paths and the fire-and-forget acceptance contract.
pub struct OfflineRecords;

fn offline<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl RecordStore for OfflineRecords {
    async fn profile(&self, _user: &UserId) -> StoreResult<Option<UserSkillProfile>> {
        offline()
    }

    async fn profiles(&self) -> StoreResult<Vec<UserSkillProfile>> {
        offline()
    }

    async fn plan(&self, _id: &PlanId) -> StoreResult<Option<DevelopmentPlan>> {
        offline()
    }

    async fn plans_with_status(
        &self,
        _statuses: &[PlanStatus],
    ) -> StoreResult<Vec<DevelopmentPlan>> {
        offline()
    }

    async fn update_plan_outcome(
        &self,
        _id: &PlanId,
        _resources: Vec<PlanResource>,
        _status: PlanStatus,
    ) -> StoreResult<()> {
        offline()
    }

    async fn append_feedback(&self, _feedback: Feedback) -> StoreResult<()> {
        offline()
    }
}

/// A catalog store that is always unreachable.
pub struct OfflineCatalog;

#[async_trait]
impl CatalogStore for OfflineCatalog {
    async fn skill(&self, _id: &SkillId) -> StoreResult<Option<Skill>> {
        offline()
    }

    async fn skills(&self) -> StoreResult<Vec<Skill>> {
        offline()
    }

    async fn skills_in_category(&self, _category: &str) -> StoreResult<Vec<Skill>> {
        offline()
    }

    async fn resource(&self, _id: &ResourceId) -> StoreResult<Option<Resource>> {
        offline()
    }

    async fn resources(&self) -> StoreResult<Vec<Resource>> {
        offline()
    }
}
