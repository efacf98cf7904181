use uuid::Uuid;

use crate::common::{ServiceError, ServiceResult};
use crate::domains::tasks::models::AgentTask;
use crate::kernel::ServerDeps;

/// Current state of one task, scoped to its owning agent. Read-only.
pub async fn get_task_status(
    agent_id: Uuid,
    task_id: Uuid,
    deps: &ServerDeps,
) -> ServiceResult<AgentTask> {
    deps.tasks
        .find_task_for_agent(agent_id, task_id)
        .await?
        .ok_or_else(|| ServiceError::task_not_found(task_id, agent_id))
}

/// Tasks owned by an agent, newest first.
pub async fn list_tasks(agent_id: Uuid, deps: &ServerDeps) -> ServiceResult<Vec<AgentTask>> {
    if deps.agents.find_agent(agent_id).await?.is_none() {
        return Err(ServiceError::agent_not_found(agent_id));
    }
    Ok(deps.tasks.list_tasks_for_agent(agent_id).await?)
}
