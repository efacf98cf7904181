//! Kernel module - server infrastructure and dependencies.

pub mod agent_roster;
pub mod ai;
pub mod deps;
pub mod jobs;
pub mod stores;
pub mod test_dependencies;
pub mod traits;

pub use agent_roster::{AgentRole, AgentRoster};
pub use ai::OpenAIAgentRuntime;
pub use deps::{ServerDeps, DEFAULT_TASK_TIMEOUT};
pub use stores::{InMemoryStore, PostgresStore};
pub use test_dependencies::{MockAgentRuntime, TestDependencies};
pub use traits::*;
