//! Job infrastructure for background task execution.
//!
//! - [`BaseJobQueue`](crate::kernel::BaseJobQueue) implementations: [`PostgresJobQueue`], [`InMemoryJobQueue`]
//! - [`JobWorker`] - long-running loop that claims jobs and runs a [`JobHandler`]
//!
//! # Architecture
//!
//! ```text
//! submit_task()
//!     │
//!     └─► queue.enqueue(TaskJob)
//!
//! JobWorker (× WORKER_CONCURRENCY)
//!     │
//!     ├─► queue.claim()            (at most one worker per job)
//!     └─► JobHandler.handle(job)   (domain code runs the task)
//! ```
//!
//! Business logic stays in `domains::tasks`; this module only moves jobs.

mod queue;
mod worker;

pub use queue::{InMemoryJobQueue, PostgresJobQueue, TaskJob};
pub use worker::{spawn_workers, JobHandler, JobWorker, JobWorkerConfig};
