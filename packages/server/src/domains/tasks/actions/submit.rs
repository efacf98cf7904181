use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::common::{ServiceError, ServiceResult};
use crate::domains::tasks::models::{AgentTask, TaskAction};
use crate::kernel::jobs::TaskJob;
use crate::kernel::ServerDeps;

/// Request body for `POST /agents/{id}/tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSubmission {
    pub action: String,
    #[serde(default = "empty_object")]
    pub parameters: Value,
    #[serde(default)]
    pub priority: i32,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Validate, record and enqueue a task. Returns as soon as the job is queued.
///
/// Nothing is written when validation fails or the agent does not exist.
pub async fn submit_task(
    agent_id: Uuid,
    submission: TaskSubmission,
    deps: &ServerDeps,
) -> ServiceResult<Uuid> {
    let action = TaskAction::parse(&submission.action, &submission.parameters)?;

    if deps.agents.find_agent(agent_id).await?.is_none() {
        return Err(ServiceError::agent_not_found(agent_id));
    }

    let task = deps
        .tasks
        .insert_task(
            AgentTask::builder()
                .agent_id(agent_id)
                .action(action.name())
                .parameters(submission.parameters)
                .priority(submission.priority)
                .build(),
        )
        .await?;

    if let Err(e) = deps.queue.enqueue(TaskJob::from(&task)).await {
        error!(task_id = %task.id, error = %e, "Failed to enqueue task");
        deps.tasks
            .mark_failed(task.id, &format!("dispatch failed: {}", e))
            .await?;
        return Err(ServiceError::Internal(e.context("failed to enqueue task")));
    }

    info!(
        task_id = %task.id,
        agent_id = %agent_id,
        action = %task.action,
        priority = task.priority,
        "Task queued"
    );

    Ok(task.id)
}
