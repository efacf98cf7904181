use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "agent_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Recruiter,
    Processor,
    Matcher,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "agent_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Active,
    Paused,
    Stopped,
    Error,
}

/// A configured agent that owns tasks.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    pub description: Option<String>,
    pub status: AgentStatus,
    pub parameters: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating an agent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAgent {
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

const MAX_NAME_LEN: usize = 255;

impl Agent {
    /// Build a fresh, active agent from a create request.
    pub fn from_new(new: NewAgent) -> ServiceResult<Self> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("agent name must not be empty".into()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ServiceError::Validation(format!(
                "agent name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            name: name.to_string(),
            agent_type: new.agent_type,
            description: new.description,
            status: AgentStatus::Active,
            parameters: Value::Object(new.parameters.unwrap_or_default()),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO agents (id, name, agent_type, description, status, parameters, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(self.agent_type)
        .bind(&self.description)
        .bind(self.status)
        .bind(&self.parameters)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM agents WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM agents ORDER BY created_at ASC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }
}
