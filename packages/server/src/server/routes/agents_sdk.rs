//! Direct agent endpoints.
//!
//! These run a capability synchronously and never create a task record.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domains::agents::actions::{self, DirectTaskRequest};
use crate::domains::tasks::models::TaskAction;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Serialize)]
pub struct DirectResponse {
    pub status: &'static str,
    pub result: Value,
}

async fn run(state: &AppState, task_id: Uuid, action: TaskAction) -> Result<Json<DirectResponse>, ApiError> {
    let result = actions::run_direct(task_id, action, &state.deps).await?;
    Ok(Json(DirectResponse {
        status: "success",
        result,
    }))
}

pub async fn process_candidate_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DirectResponse>, ApiError> {
    let Json(body) = payload?;
    let action = TaskAction::parse("process_candidate", &body)?;
    run(&state, Uuid::now_v7(), action).await
}

pub async fn search_candidates_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DirectResponse>, ApiError> {
    let Json(body) = payload?;
    let action = TaskAction::parse("search_candidates", &body)?;
    run(&state, Uuid::now_v7(), action).await
}

pub async fn process_task_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<DirectTaskRequest>, JsonRejection>,
) -> Result<Json<DirectResponse>, ApiError> {
    let Json(request) = payload?;
    let action = TaskAction::triage(&request.action, &request.parameters)?;
    run(&state, request.task_id.unwrap_or_else(Uuid::now_v7), action).await
}
