//! Networked trigger.
//!
//! Pushes the serialized job to an external queue endpoint consumed by a
//! separate worker process. Ordering is whatever the backing store provides;
//! callers must not assume FIFO. A failed push is logged and the job is
//! dropped; the enqueue contract is "accepted", not "delivered".

use async_trait::async_trait;

use crate::{Job, JobTrigger};

/// Queue name jobs are pushed to by default.
pub const DEFAULT_QUEUE_NAME: &str = "recommendations";

pub struct RemoteTrigger {
    client: reqwest::Client,
    base_url: String,
    queue: String,
}

impl RemoteTrigger {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_queue(base_url, DEFAULT_QUEUE_NAME)
    }

    pub fn with_queue(base_url: impl Into<String>, queue: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            queue: queue.into(),
        }
    }

    fn push_url(&self) -> String {
        format!("{}/queue/{}", self.base_url, self.queue)
    }
}

#[async_trait]
impl JobTrigger for RemoteTrigger {
    async fn enqueue(&self, job: Job) {
        match self.client.post(self.push_url()).json(&job).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(
                    target: "uplevel::queue",
                    job = %job.id,
                    queue = %self.queue,
                    "job pushed to remote queue"
                );
            }
            Ok(response) => {
                tracing::error!(
                    target: "uplevel::queue",
                    job = %job.id,
                    status = %response.status(),
                    "remote queue rejected job; dropping"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: "uplevel::queue",
                    job = %job.id,
                    %error,
                    "remote queue push failed; dropping job"
                );
            }
        }
    }
}
