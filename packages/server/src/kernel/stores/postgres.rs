use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domains::agents::models::Agent;
use crate::domains::tasks::models::AgentTask;
use crate::kernel::{BaseAgentStore, BaseTaskStore};

/// Store backed by the `agents` and `agent_tasks` tables.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseAgentStore for PostgresStore {
    async fn insert_agent(&self, agent: Agent) -> Result<Agent> {
        agent.insert(&self.pool).await.context("Failed to insert agent")
    }

    async fn find_agent(&self, id: Uuid) -> Result<Option<Agent>> {
        Agent::find_by_id(id, &self.pool).await
    }

    async fn list_agents(&self) -> Result<Vec<Agent>> {
        Agent::find_all(&self.pool).await
    }
}

#[async_trait]
impl BaseTaskStore for PostgresStore {
    async fn insert_task(&self, task: AgentTask) -> Result<AgentTask> {
        task.insert(&self.pool).await.context("Failed to insert task")
    }

    async fn find_task(&self, task_id: Uuid) -> Result<Option<AgentTask>> {
        AgentTask::find_by_id(task_id, &self.pool).await
    }

    async fn find_task_for_agent(
        &self,
        agent_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<AgentTask>> {
        AgentTask::find_for_agent(agent_id, task_id, &self.pool).await
    }

    async fn list_tasks_for_agent(&self, agent_id: Uuid) -> Result<Vec<AgentTask>> {
        AgentTask::find_by_agent(agent_id, &self.pool).await
    }

    async fn mark_running(&self, task_id: Uuid) -> Result<Option<AgentTask>> {
        AgentTask::mark_running(task_id, &self.pool).await
    }

    async fn mark_completed(&self, task_id: Uuid, result: Value) -> Result<Option<AgentTask>> {
        AgentTask::mark_completed(task_id, &result, &self.pool).await
    }

    async fn mark_failed(&self, task_id: Uuid, error: &str) -> Result<Option<AgentTask>> {
        AgentTask::mark_failed(task_id, error, &self.pool).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }
}
