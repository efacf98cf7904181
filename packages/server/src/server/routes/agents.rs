use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    Json,
};

use crate::common::ServiceError;
use crate::domains::agents::actions;
use crate::domains::agents::models::{Agent, NewAgent};
use crate::server::app::AppState;
use crate::server::error::{parse_path_id, ApiError};

pub async fn create_agent_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<NewAgent>, JsonRejection>,
) -> Result<(StatusCode, Json<Agent>), ApiError> {
    let Json(new) = payload?;
    let agent = actions::create_agent(new, &state.deps).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn list_agents_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Agent>>, ApiError> {
    Ok(Json(actions::list_agents(&state.deps).await?))
}

pub async fn get_agent_handler(
    Extension(state): Extension<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Agent>, ApiError> {
    let id = parse_path_id(&agent_id, || ServiceError::agent_not_found(&agent_id))?;
    Ok(Json(actions::get_agent(id, &state.deps).await?))
}
