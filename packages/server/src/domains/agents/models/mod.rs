mod agent;

pub use agent::{Agent, AgentStatus, AgentType, NewAgent};
