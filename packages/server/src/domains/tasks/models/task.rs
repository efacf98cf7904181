use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use typed_builder::TypedBuilder;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Queued,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Forward-only lifecycle. `queued -> failed` covers a task that could
    /// not be handed to the queue and never ran.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Queued, TaskStatus::Running)
                | (TaskStatus::Queued, TaskStatus::Failed)
                | (TaskStatus::Running, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }
}

/// A unit of background work owned by an agent.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct AgentTask {
    #[builder(default = Uuid::now_v7())]
    pub id: Uuid,
    pub agent_id: Uuid,
    pub action: String,
    #[builder(default = Value::Object(Default::default()))]
    pub parameters: Value,
    #[builder(default)]
    pub priority: i32,

    #[builder(default)]
    pub status: TaskStatus,
    #[builder(default, setter(strip_option))]
    pub result: Option<Value>,
    #[builder(default, setter(strip_option))]
    pub error: Option<String>,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default, setter(strip_option))]
    pub started_at: Option<DateTime<Utc>>,
    #[builder(default, setter(strip_option))]
    pub completed_at: Option<DateTime<Utc>>,
}

impl AgentTask {
    // =========================================================================
    // In-place transitions (return false when the move is not allowed)
    // =========================================================================

    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(TaskStatus::Running) {
            return false;
        }
        self.status = TaskStatus::Running;
        self.started_at = Some(now);
        true
    }

    pub fn complete(&mut self, result: Value, now: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(TaskStatus::Completed) {
            return false;
        }
        self.status = TaskStatus::Completed;
        self.result = Some(result);
        self.completed_at = Some(clamp_after(self.started_at, now));
        true
    }

    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(TaskStatus::Failed) {
            return false;
        }
        self.status = TaskStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(clamp_after(self.started_at, now));
        true
    }

    // =========================================================================
    // PostgreSQL persistence
    // =========================================================================

    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO agent_tasks (id, agent_id, action, parameters, priority, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.agent_id)
        .bind(&self.action)
        .bind(&self.parameters)
        .bind(self.priority)
        .bind(self.status)
        .bind(self.created_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM agent_tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_for_agent(agent_id: Uuid, id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM agent_tasks WHERE id = $1 AND agent_id = $2")
            .bind(id)
            .bind(agent_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_agent(agent_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM agent_tasks WHERE agent_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(agent_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// `queued -> running`. Returns `None` if the task is not queued.
    pub async fn mark_running(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE agent_tasks
            SET status = 'running', started_at = NOW()
            WHERE id = $1 AND status = 'queued'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// `running -> completed`. Returns `None` if the task is not running.
    pub async fn mark_completed(id: Uuid, result: &Value, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE agent_tasks
            SET status = 'completed', result = $2, completed_at = GREATEST(NOW(), started_at)
            WHERE id = $1 AND status = 'running'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(result)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// `queued | running -> failed`. Returns `None` if the task is already terminal.
    pub async fn mark_failed(id: Uuid, error: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE agent_tasks
            SET status = 'failed', error = $2, completed_at = GREATEST(NOW(), started_at)
            WHERE id = $1 AND status IN ('queued', 'running')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(error)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }
}

fn clamp_after(started_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match started_at {
        Some(started) if started > now => started,
        _ => now,
    }
}

/// Task record as returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task_id: Uuid,
    pub agent_id: Uuid,
    pub action: String,
    pub status: TaskStatus,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<AgentTask> for TaskResponse {
    fn from(task: AgentTask) -> Self {
        Self {
            task_id: task.id,
            agent_id: task.agent_id,
            action: task.action,
            status: task.status,
            result: task.result,
            error: task.error,
            created_at: task.created_at,
            started_at: task.started_at,
            completed_at: task.completed_at,
        }
    }
}
