use tracing::info;
use uuid::Uuid;

use crate::common::{ServiceError, ServiceResult};
use crate::domains::agents::models::{Agent, NewAgent};
use crate::kernel::ServerDeps;

pub async fn create_agent(new: NewAgent, deps: &ServerDeps) -> ServiceResult<Agent> {
    let agent = deps.agents.insert_agent(Agent::from_new(new)?).await?;
    info!(agent_id = %agent.id, agent_type = ?agent.agent_type, "Agent created");
    Ok(agent)
}

pub async fn get_agent(agent_id: Uuid, deps: &ServerDeps) -> ServiceResult<Agent> {
    deps.agents
        .find_agent(agent_id)
        .await?
        .ok_or_else(|| ServiceError::agent_not_found(agent_id))
}

pub async fn list_agents(deps: &ServerDeps) -> ServiceResult<Vec<Agent>> {
    Ok(deps.agents.list_agents().await?)
}
