//! In-process trigger.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::runner::{run_recommendation, RunnerContext};
use crate::{Job, JobTrigger};

/// In-process queue: an unbounded channel drained FIFO by one detached
/// worker task.
///
/// Job failures are caught and logged inside the worker; nothing escapes to
/// crash the host process and nothing is retried. Queued jobs are dropped on
/// shutdown; they are transient by contract.
pub struct LocalTrigger {
    sender: mpsc::UnboundedSender<Job>,
    worker: JoinHandle<()>,
}

impl LocalTrigger {
    /// Spawn the worker and return the trigger handle.
    pub fn spawn(ctx: RunnerContext) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                tracing::info!(
                    target: "uplevel::queue",
                    job = %job.id,
                    user = %job.payload.user_id,
                    plan = %job.payload.plan_id,
                    "job started"
                );
                if let Err(error) = run_recommendation(&ctx, &job.payload).await {
                    tracing::error!(
                        target: "uplevel::queue",
                        job = %job.id,
                        error = ?error,
                        "job failed; plan left unchanged"
                    );
                }
            }
        });
        Self { sender, worker }
    }

    /// Abort the worker task.
    pub fn shutdown(&self) {
        self.worker.abort();
    }
}

impl Drop for LocalTrigger {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

#[async_trait]
impl JobTrigger for LocalTrigger {
    async fn enqueue(&self, job: Job) {
        // Send only fails after shutdown; the contract is still "accepted".
        if let Err(error) = self.sender.send(job) {
            tracing::error!(
                target: "uplevel::queue",
                %error,
                "queue worker gone; job dropped"
            );
        }
    }
}
