//! Job worker pool.
//!
//! Each `JobWorker` is a long-running loop that:
//! - Claims the next job from the [`BaseJobQueue`]
//! - Hands it to a [`JobHandler`] and awaits the outcome
//! - Logs failures (the handler has already recorded them; nothing is requeued)
//! - Sleeps for the poll interval when the queue is empty
//!
//! ```text
//! spawn_workers(n)
//!     │
//!     └─► JobWorker × n ──► queue.claim() ──► handler.handle(job)
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::TaskJob;
use crate::kernel::BaseJobQueue;

/// Configuration for the job workers.
#[derive(Debug, Clone)]
pub struct JobWorkerConfig {
    /// How long an idle worker waits before polling again
    pub poll_interval: Duration,
    /// Back-off after the queue itself errors
    pub error_backoff: Duration,
    /// Worker ID for this instance
    pub worker_id: String,
}

impl Default for JobWorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            error_backoff: Duration::from_secs(1),
            worker_id: format!("worker-{}", Uuid::new_v4()),
        }
    }
}

impl JobWorkerConfig {
    /// Create a new config with a specific worker ID.
    pub fn with_worker_id(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            ..Default::default()
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Executes one claimed job.
///
/// Implementations own the task record transitions. An `Err` means the task
/// ended `failed`; the worker only logs it.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: TaskJob) -> Result<()>;
}

/// A worker that processes jobs from a queue, one at a time.
pub struct JobWorker {
    queue: Arc<dyn BaseJobQueue>,
    handler: Arc<dyn JobHandler>,
    config: JobWorkerConfig,
}

impl JobWorker {
    pub fn new(
        queue: Arc<dyn BaseJobQueue>,
        handler: Arc<dyn JobHandler>,
        config: JobWorkerConfig,
    ) -> Self {
        Self {
            queue,
            handler,
            config,
        }
    }

    /// Claim and run a single job. Returns `false` when the queue was empty.
    pub async fn run_once(&self) -> Result<bool> {
        let Some(job) = self.queue.claim().await? else {
            return Ok(false);
        };

        let task_id = job.task_id;
        let action = job.action.clone();
        debug!(worker_id = %self.config.worker_id, task_id = %task_id, action = %action, "claimed job");

        if let Err(e) = self.handler.handle(job).await {
            warn!(
                worker_id = %self.config.worker_id,
                task_id = %task_id,
                action = %action,
                error = %e,
                "job failed"
            );
        }
        Ok(true)
    }

    /// Run until `shutdown` is cancelled. An in-flight job is always finished.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(worker_id = %self.config.worker_id, "job worker starting");

        while !shutdown.is_cancelled() {
            match self.run_once().await {
                Ok(true) => continue,
                Ok(false) => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
                Err(e) => {
                    error!(worker_id = %self.config.worker_id, error = %e, "failed to claim job");
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.config.error_backoff) => {}
                    }
                }
            }
        }

        info!(worker_id = %self.config.worker_id, "job worker stopped");
    }
}

/// Spawn `concurrency` workers sharing one queue and handler.
pub fn spawn_workers(
    concurrency: usize,
    queue: Arc<dyn BaseJobQueue>,
    handler: Arc<dyn JobHandler>,
    poll_interval: Duration,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    (0..concurrency.max(1))
        .map(|n| {
            let config = JobWorkerConfig::with_worker_id(format!("worker-{}", n))
                .poll_interval(poll_interval);
            let worker = JobWorker::new(queue.clone(), handler.clone(), config);
            tokio::spawn(worker.run(shutdown.clone()))
        })
        .collect()
}
