// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (what to prompt for, how to shape results) lives in domains.
//
// Naming convention: Base* for trait names (e.g., BaseAgentRuntime, BaseTaskStore)

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::agent_roster::AgentRole;
use super::jobs::TaskJob;
use crate::domains::agents::models::Agent;
use crate::domains::tasks::models::AgentTask;

// =============================================================================
// Agent Runtime Trait (External capability - hosted LLM agents)
// =============================================================================

#[async_trait]
pub trait BaseAgentRuntime: Send + Sync {
    /// Run `prompt` through the agent playing `role` and return its final text output.
    ///
    /// The triage role delegates to one of the specialists chosen by the model.
    async fn invoke(&self, role: AgentRole, prompt: &str) -> Result<String>;
}

// =============================================================================
// Agent Store Trait
// =============================================================================

#[async_trait]
pub trait BaseAgentStore: Send + Sync {
    async fn insert_agent(&self, agent: Agent) -> Result<Agent>;

    async fn find_agent(&self, id: Uuid) -> Result<Option<Agent>>;

    /// All agents, oldest first.
    async fn list_agents(&self) -> Result<Vec<Agent>>;
}

// =============================================================================
// Task Store Trait
// =============================================================================

/// Task record persistence.
///
/// Transition methods are conditional on the current status and return
/// `None` when the task is missing or the move is not allowed, so a late or
/// duplicate writer can never move a task backwards.
#[async_trait]
pub trait BaseTaskStore: Send + Sync {
    async fn insert_task(&self, task: AgentTask) -> Result<AgentTask>;

    async fn find_task(&self, task_id: Uuid) -> Result<Option<AgentTask>>;

    /// Lookup scoped to the owning agent.
    async fn find_task_for_agent(&self, agent_id: Uuid, task_id: Uuid)
        -> Result<Option<AgentTask>>;

    /// Tasks of one agent, newest first.
    async fn list_tasks_for_agent(&self, agent_id: Uuid) -> Result<Vec<AgentTask>>;

    /// `queued -> running`, stamping `started_at`.
    async fn mark_running(&self, task_id: Uuid) -> Result<Option<AgentTask>>;

    /// `running -> completed`, storing the result.
    async fn mark_completed(&self, task_id: Uuid, result: Value) -> Result<Option<AgentTask>>;

    /// `queued | running -> failed`, storing the error.
    async fn mark_failed(&self, task_id: Uuid, error: &str) -> Result<Option<AgentTask>>;

    /// Connectivity probe for health checks.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Job Queue Trait (Execution backend delivery)
// =============================================================================

#[async_trait]
pub trait BaseJobQueue: Send + Sync {
    /// Hand a job to the worker pool. Never blocks on execution.
    async fn enqueue(&self, job: TaskJob) -> Result<()>;

    /// Take the next job, highest priority first then oldest first.
    ///
    /// A claimed job is removed from the queue, so each job is delivered to
    /// at most one worker.
    async fn claim(&self) -> Result<Option<TaskJob>>;

    /// Number of jobs waiting to be claimed.
    async fn depth(&self) -> Result<i64>;
}
