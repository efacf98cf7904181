//! Task actions - submission and read-only status queries.

mod queries;
mod submit;

pub use queries::{get_task_status, list_tasks};
pub use submit::{submit_task, TaskSubmission};
