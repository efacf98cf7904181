//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! actions and the job handler. It is built once at startup and passed by
//! reference; nothing in it is a process-wide global.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use super::jobs::{InMemoryJobQueue, PostgresJobQueue};
use super::stores::{InMemoryStore, PostgresStore};
use super::{BaseAgentRuntime, BaseAgentStore, BaseJobQueue, BaseTaskStore};

/// Default wall-clock limit for one task's capability call.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(300);

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub agents: Arc<dyn BaseAgentStore>,
    pub tasks: Arc<dyn BaseTaskStore>,
    pub queue: Arc<dyn BaseJobQueue>,
    /// Hosted agent runtime that does the actual evaluation work.
    pub runtime: Arc<dyn BaseAgentRuntime>,
    /// Coarse job-level limit around the runtime call.
    pub task_timeout: Duration,
}

impl ServerDeps {
    pub fn new(
        agents: Arc<dyn BaseAgentStore>,
        tasks: Arc<dyn BaseTaskStore>,
        queue: Arc<dyn BaseJobQueue>,
        runtime: Arc<dyn BaseAgentRuntime>,
        task_timeout: Duration,
    ) -> Self {
        Self {
            agents,
            tasks,
            queue,
            runtime,
            task_timeout,
        }
    }

    /// PostgreSQL store and queue sharing one pool.
    pub fn postgres(pool: PgPool, runtime: Arc<dyn BaseAgentRuntime>) -> Self {
        let store = Arc::new(PostgresStore::new(pool.clone()));
        Self::new(
            store.clone(),
            store,
            Arc::new(PostgresJobQueue::new(pool)),
            runtime,
            DEFAULT_TASK_TIMEOUT,
        )
    }

    /// Process-local store and queue.
    pub fn in_memory(runtime: Arc<dyn BaseAgentRuntime>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(
            store.clone(),
            store,
            Arc::new(InMemoryJobQueue::new()),
            runtime,
            DEFAULT_TASK_TIMEOUT,
        )
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }
}
