//! Task job queues.
//!
//! A [`TaskJob`] is the delivery message for one task record. Two backends:
//! - [`PostgresJobQueue`] - `task_jobs` table, claimed with `FOR UPDATE SKIP LOCKED`
//! - [`InMemoryJobQueue`] - process-local, for tests and database-less runs

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::domains::tasks::models::AgentTask;
use crate::kernel::BaseJobQueue;

/// Message telling a worker which task to run and with what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskJob {
    pub task_id: Uuid,
    pub action: String,
    pub parameters: Value,
    pub priority: i32,
    pub enqueued_at: DateTime<Utc>,
}

impl From<&AgentTask> for TaskJob {
    fn from(task: &AgentTask) -> Self {
        Self {
            task_id: task.id,
            action: task.action.clone(),
            parameters: task.parameters.clone(),
            priority: task.priority,
            enqueued_at: Utc::now(),
        }
    }
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// PostgreSQL-backed job queue.
#[derive(Clone)]
pub struct PostgresJobQueue {
    pool: PgPool,
}

impl PostgresJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseJobQueue for PostgresJobQueue {
    async fn enqueue(&self, job: TaskJob) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO task_jobs (task_id, action, parameters, priority, enqueued_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (task_id) DO NOTHING
            "#,
        )
        .bind(job.task_id)
        .bind(&job.action)
        .bind(&job.parameters)
        .bind(job.priority)
        .bind(job.enqueued_at)
        .execute(&self.pool)
        .await?;

        debug!(task_id = %job.task_id, action = %job.action, "Enqueued task job");
        Ok(())
    }

    async fn claim(&self) -> Result<Option<TaskJob>> {
        // Deleting on claim makes delivery at-most-once: a crash after this
        // point leaves the task record `queued` or `running`, never re-run.
        let job = sqlx::query_as::<_, TaskJob>(
            r#"
            DELETE FROM task_jobs
            WHERE task_id = (
                SELECT task_id
                FROM task_jobs
                ORDER BY priority DESC, enqueued_at ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING task_id, action, parameters, priority, enqueued_at
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    async fn depth(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM task_jobs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local job queue.
#[derive(Default)]
pub struct InMemoryJobQueue {
    jobs: Mutex<Vec<TaskJob>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the waiting jobs, in insertion order.
    pub fn pending(&self) -> Vec<TaskJob> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl BaseJobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: TaskJob) -> Result<()> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        if jobs.iter().any(|j| j.task_id == job.task_id) {
            return Ok(());
        }
        debug!(task_id = %job.task_id, action = %job.action, "Enqueued task job");
        jobs.push(job);
        Ok(())
    }

    async fn claim(&self) -> Result<Option<TaskJob>> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());

        // Highest priority wins; among equals the earliest pushed (first index).
        let mut best: Option<usize> = None;
        for (idx, job) in jobs.iter().enumerate() {
            match best {
                Some(b) if jobs[b].priority >= job.priority => {}
                _ => best = Some(idx),
            }
        }

        Ok(best.map(|idx| jobs.remove(idx)))
    }

    async fn depth(&self) -> Result<i64> {
        Ok(self.jobs.lock().unwrap_or_else(|e| e.into_inner()).len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(priority: i32) -> TaskJob {
        TaskJob {
            task_id: Uuid::now_v7(),
            action: "process_candidate".into(),
            parameters: json!({}),
            priority,
            enqueued_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn claims_in_fifo_order_for_equal_priority() {
        let queue = InMemoryJobQueue::new();
        let first = job(0);
        let second = job(0);
        queue.enqueue(first.clone()).await.unwrap();
        queue.enqueue(second.clone()).await.unwrap();

        assert_eq!(queue.claim().await.unwrap().unwrap().task_id, first.task_id);
        assert_eq!(queue.claim().await.unwrap().unwrap().task_id, second.task_id);
        assert!(queue.claim().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn higher_priority_is_claimed_first() {
        let queue = InMemoryJobQueue::new();
        let low = job(0);
        let high = job(5);
        queue.enqueue(low.clone()).await.unwrap();
        queue.enqueue(high.clone()).await.unwrap();

        assert_eq!(queue.claim().await.unwrap().unwrap().task_id, high.task_id);
        assert_eq!(queue.claim().await.unwrap().unwrap().task_id, low.task_id);
    }

    #[tokio::test]
    async fn duplicate_enqueue_is_ignored() {
        let queue = InMemoryJobQueue::new();
        let j = job(0);
        queue.enqueue(j.clone()).await.unwrap();
        queue.enqueue(j).await.unwrap();

        assert_eq!(queue.depth().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn a_job_is_delivered_once() {
        let queue = std::sync::Arc::new(InMemoryJobQueue::new());
        queue.enqueue(job(0)).await.unwrap();

        let (a, b) = tokio::join!(queue.claim(), queue.claim());
        let delivered = [a.unwrap(), b.unwrap()]
            .into_iter()
            .filter(Option::is_some)
            .count();
        assert_eq!(delivered, 1);
    }

    #[test]
    fn job_from_task_copies_payload() {
        let task = AgentTask::builder()
            .agent_id(Uuid::now_v7())
            .action("search_candidates")
            .parameters(json!({"job_requirements": {"title": "SRE"}}))
            .priority(3)
            .build();

        let job = TaskJob::from(&task);
        assert_eq!(job.task_id, task.id);
        assert_eq!(job.action, "search_candidates");
        assert_eq!(job.parameters["job_requirements"]["title"], "SRE");
        assert_eq!(job.priority, 3);
    }
}
