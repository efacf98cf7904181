use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::common::ServiceError;
use crate::domains::tasks::actions::{self, TaskSubmission};
use crate::domains::tasks::models::{TaskResponse, TaskStatus};
use crate::server::app::AppState;
use crate::server::error::{parse_path_id, ApiError};

#[derive(Debug, Serialize)]
pub struct TaskAccepted {
    pub task_id: Uuid,
    pub status: TaskStatus,
}

pub async fn submit_task_handler(
    Extension(state): Extension<AppState>,
    Path(agent_id): Path<String>,
    payload: Result<Json<TaskSubmission>, JsonRejection>,
) -> Result<Json<TaskAccepted>, ApiError> {
    let agent_id = parse_path_id(&agent_id, || ServiceError::agent_not_found(&agent_id))?;
    let Json(submission) = payload?;

    let task_id = actions::submit_task(agent_id, submission, &state.deps).await?;
    Ok(Json(TaskAccepted {
        task_id,
        status: TaskStatus::Queued,
    }))
}

pub async fn list_tasks_handler(
    Extension(state): Extension<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let agent_id = parse_path_id(&agent_id, || ServiceError::agent_not_found(&agent_id))?;
    let tasks = actions::list_tasks(agent_id, &state.deps).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

pub async fn get_task_handler(
    Extension(state): Extension<AppState>,
    Path((agent_id, task_id)): Path<(String, String)>,
) -> Result<Json<TaskResponse>, ApiError> {
    let not_found = || ServiceError::task_not_found(&task_id, &agent_id);
    let agent = parse_path_id(&agent_id, not_found)?;
    let task = parse_path_id(&task_id, not_found)?;

    let task = actions::get_task_status(agent, task, &state.deps).await?;
    Ok(Json(task.into()))
}
