//! Fire-and-forget job trigger.
//!
//! `enqueue` means "accepted for processing", never "completed": execution
//! happens out of band, at most once, with no retry, no backoff, no
//! dead-letter handling, and no completion signal back to the caller. A
//! caller needing guaranteed execution must re-enqueue explicitly. Jobs are
//! transient and do not survive a process restart.
//!
//! Two backends present the same contract: a detached in-process worker
//! (FIFO) and a push to an external queue consumed by a separate worker
//! (ordering is whatever that store provides).

mod local;
mod remote;
mod runner;

pub use local::LocalTrigger;
pub use remote::{RemoteTrigger, DEFAULT_QUEUE_NAME};
pub use runner::{run_recommendation, RunnerContext};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uplevel_catalog::{PlanId, UserId};
use uuid::Uuid;

/// Payload of a recommendation job: which user's plan to recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationJob {
    pub user_id: UserId,
    pub plan_id: PlanId,
}

/// A queued unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub payload: RecommendationJob,
    pub enqueued_at: DateTime<Utc>,
}

impl Job {
    pub fn new(payload: RecommendationJob) -> Self {
        Self {
            id: JobId::new(),
            payload,
            enqueued_at: Utc::now(),
        }
    }
}

/// Newtype for job ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short display: first 8 chars of the UUID.
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Accepts jobs for out-of-band execution.
#[async_trait]
pub trait JobTrigger: Send + Sync {
    /// Accept a job. Returns as soon as the job is handed off; acceptance is
    /// not a promise of completion, and failures downstream are only logged.
    async fn enqueue(&self, job: Job);
}
