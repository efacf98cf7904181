//! Agents domain - configured agents that own tasks, plus direct
//! (record-less) invocation of the hosted agents.

pub mod actions;
pub mod models;

pub use models::{Agent, AgentStatus, AgentType, NewAgent};
