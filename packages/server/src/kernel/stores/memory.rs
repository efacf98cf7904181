use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::domains::agents::models::Agent;
use crate::domains::tasks::models::AgentTask;
use crate::kernel::{BaseAgentStore, BaseTaskStore};

/// Process-local store. Transitions run under the write lock, so the
/// status check and the update are atomic.
#[derive(Default)]
pub struct InMemoryStore {
    agents: RwLock<HashMap<Uuid, Agent>>,
    tasks: RwLock<HashMap<Uuid, AgentTask>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of task records, across all agents.
    pub fn task_count(&self) -> usize {
        self.tasks.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn transition<F>(&self, task_id: Uuid, apply: F) -> Option<AgentTask>
    where
        F: FnOnce(&mut AgentTask) -> bool,
    {
        let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
        let task = tasks.get_mut(&task_id)?;
        apply(task).then(|| task.clone())
    }
}

#[async_trait]
impl BaseAgentStore for InMemoryStore {
    async fn insert_agent(&self, agent: Agent) -> Result<Agent> {
        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        if agents.contains_key(&agent.id) {
            bail!("agent {} already exists", agent.id);
        }
        agents.insert(agent.id, agent.clone());
        Ok(agent)
    }

    async fn find_agent(&self, id: Uuid) -> Result<Option<Agent>> {
        Ok(self
            .agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned())
    }

    async fn list_agents(&self) -> Result<Vec<Agent>> {
        let mut agents: Vec<Agent> = self
            .agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        agents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(agents)
    }
}

#[async_trait]
impl BaseTaskStore for InMemoryStore {
    async fn insert_task(&self, task: AgentTask) -> Result<AgentTask> {
        let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
        if tasks.contains_key(&task.id) {
            bail!("task {} already exists", task.id);
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, task_id: Uuid) -> Result<Option<AgentTask>> {
        Ok(self
            .tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&task_id)
            .cloned())
    }

    async fn find_task_for_agent(
        &self,
        agent_id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<AgentTask>> {
        Ok(self
            .find_task(task_id)
            .await?
            .filter(|task| task.agent_id == agent_id))
    }

    async fn list_tasks_for_agent(&self, agent_id: Uuid) -> Result<Vec<AgentTask>> {
        let mut tasks: Vec<AgentTask> = self
            .tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|task| task.agent_id == agent_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn mark_running(&self, task_id: Uuid) -> Result<Option<AgentTask>> {
        Ok(self.transition(task_id, |task| task.start(Utc::now())))
    }

    async fn mark_completed(&self, task_id: Uuid, result: Value) -> Result<Option<AgentTask>> {
        Ok(self.transition(task_id, |task| task.complete(result, Utc::now())))
    }

    async fn mark_failed(&self, task_id: Uuid, error: &str) -> Result<Option<AgentTask>> {
        Ok(self.transition(task_id, |task| task.fail(error, Utc::now())))
    }
}
