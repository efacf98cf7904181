//! Tasks domain - dispatch, status and background execution of agent tasks.

pub mod actions;
pub mod effects;
pub mod models;

pub use models::{AgentTask, TaskAction, TaskResponse, TaskStatus};
