// Agent runtime implementation using OpenAI
//
// This is the infrastructure implementation of BaseAgentRuntime.
// Business logic (what to prompt for) lives in domain layers.

use std::collections::HashMap;
use std::future::Future;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rig::agent::Agent;
use rig::completion::Prompt;
use rig::providers::openai;

use super::agent_roster::{AgentRole, AgentRoster};
use super::BaseAgentRuntime;

/// Hosted agents, one per role, built once from an [`AgentRoster`].
pub struct OpenAIAgentRuntime {
    agents: HashMap<AgentRole, Agent<openai::CompletionModel>>,
    model: String,
}

impl OpenAIAgentRuntime {
    pub fn new(api_key: &str, roster: &AgentRoster) -> Self {
        let client = openai::Client::new(api_key);

        let agents = roster
            .roles()
            .map(|(role, profile)| {
                let agent = client
                    .agent(&roster.model)
                    .preamble(profile.instructions)
                    .temperature(profile.temperature)
                    .max_tokens(roster.max_tokens)
                    .build();
                (*role, agent)
            })
            .collect();

        Self {
            agents,
            model: roster.model.clone(),
        }
    }

    async fn prompt_role(&self, role: AgentRole, prompt: &str) -> Result<String> {
        let agent = self
            .agents
            .get(&role)
            .ok_or_else(|| anyhow!("no agent configured for role {}", role))?;

        tracing::info!(
            role = %role,
            model = %self.model,
            prompt_length = prompt.len(),
            "Calling OpenAI API"
        );

        let response = agent
            .prompt(prompt)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    role = %role,
                    model = %self.model,
                    prompt_preview = %preview(prompt),
                    "OpenAI API call failed"
                );
                e
            })
            .with_context(|| format!("{} agent call failed", role))?;

        tracing::info!(
            role = %role,
            response_length = response.len(),
            "OpenAI API response received"
        );

        Ok(response)
    }
}

#[async_trait]
impl BaseAgentRuntime for OpenAIAgentRuntime {
    async fn invoke(&self, role: AgentRole, prompt: &str) -> Result<String> {
        if role != AgentRole::Triage {
            return self.prompt_role(role, prompt).await;
        }

        route_through_triage(prompt, move |role, prompt| async move {
            self.prompt_role(role, &prompt).await
        })
        .await
    }
}

/// Ask the triage agent which specialist fits, then hand it the original prompt.
///
/// The routing decision belongs to the hosted model; a reply naming no
/// specialist is an error.
async fn route_through_triage<F, Fut>(prompt: &str, mut call: F) -> Result<String>
where
    F: FnMut(AgentRole, String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let reply = call(AgentRole::Triage, prompt.to_string()).await?;
    let target = AgentRole::from_triage_reply(&reply)
        .ok_or_else(|| anyhow!("triage agent named no specialist: {:?}", preview(&reply)))?;

    tracing::debug!(target = %target, "Triage routed task");
    call(target, prompt.to_string()).await
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
