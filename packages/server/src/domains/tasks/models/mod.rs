pub mod task;
pub mod task_action;

pub use task::{AgentTask, TaskResponse, TaskStatus};
pub use task_action::{
    JsonObject, MatchCandidatesParams, ProcessApplicationParams, ProcessCandidateParams,
    ScoreCandidateParams, SearchCandidatesParams, TaskAction,
};
