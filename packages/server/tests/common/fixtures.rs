//! Test fixtures for creating test data.

use agents_core::domains::agents::models::{Agent, AgentType, NewAgent};
use agents_core::kernel::BaseAgentStore;
use anyhow::Result;
use serde_json::{json, Value};

pub fn new_agent(name: &str, agent_type: AgentType) -> NewAgent {
    NewAgent {
        name: name.to_string(),
        agent_type,
        description: Some(format!("{} test agent", name)),
        parameters: None,
    }
}

/// Insert an active agent directly through a store.
pub async fn create_test_agent(store: &dyn BaseAgentStore, name: &str) -> Result<Agent> {
    let agent = Agent::from_new(new_agent(name, AgentType::Recruiter))?;
    store.insert_agent(agent).await
}

pub fn candidate_params(candidate_id: &str) -> Value {
    json!({
        "candidate_data": {
            "id": candidate_id,
            "name": "Ada Lovelace",
            "skills": ["rust", "postgres"],
            "years_experience": 7
        },
        "job_data": {
            "id": "job-42",
            "title": "Backend Engineer"
        }
    })
}
