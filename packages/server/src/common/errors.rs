use thiserror::Error;

/// Errors surfaced by agent and task operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("External capability failed: {0}")]
    ExternalCapability(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn agent_not_found(agent_id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Agent with ID {}", agent_id))
    }

    pub fn task_not_found(task_id: impl std::fmt::Display, agent_id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Task with ID {} for agent {}", task_id, agent_id))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
