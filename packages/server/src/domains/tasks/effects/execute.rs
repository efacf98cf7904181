//! TaskJobHandler - runs one claimed task to a terminal state.
//!
//!   claim → mark_running → TaskAction::run (bounded by task_timeout)
//!         → mark_completed | mark_failed
//!
//! No retry. A failure is recorded on the task and returned to the worker,
//! which logs it and moves on.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::domains::tasks::models::TaskAction;
use crate::kernel::jobs::{JobHandler, TaskJob};
use crate::kernel::ServerDeps;

pub struct TaskJobHandler {
    deps: Arc<ServerDeps>,
}

impl TaskJobHandler {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }

    async fn execute(&self, job: &TaskJob) -> Result<serde_json::Value> {
        let action = TaskAction::parse(&job.action, &job.parameters)?;

        match tokio::time::timeout(
            self.deps.task_timeout,
            action.run(job.task_id, self.deps.runtime.as_ref()),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(anyhow!(
                "task timed out after {}s",
                self.deps.task_timeout.as_secs_f64()
            )),
        }
    }
}

#[async_trait]
impl JobHandler for TaskJobHandler {
    async fn handle(&self, job: TaskJob) -> Result<()> {
        let Some(task) = self.deps.tasks.mark_running(job.task_id).await? else {
            debug!(task_id = %job.task_id, "Task no longer queued, dropping job");
            return Ok(());
        };

        info!(task_id = %task.id, action = %task.action, "Task started");

        match self.execute(&job).await {
            Ok(result) => match self.deps.tasks.mark_completed(task.id, result).await {
                Ok(Some(_)) => {
                    info!(task_id = %task.id, action = %task.action, "Task completed");
                    Ok(())
                }
                Ok(None) => {
                    debug!(task_id = %task.id, "Task left running state before completion");
                    Ok(())
                }
                Err(e) => {
                    // The task must still end in a terminal state.
                    let message = format!("failed to record result: {:#}", e);
                    error!(task_id = %task.id, action = %task.action, error = %message, "Task failed");
                    self.deps.tasks.mark_failed(task.id, &message).await?;
                    Err(e)
                }
            },
            Err(e) => {
                let message = format!("{:#}", e);
                error!(task_id = %task.id, action = %task.action, error = %message, "Task failed");
                self.deps.tasks.mark_failed(task.id, &message).await?;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{json, Value};
    use uuid::Uuid;

    use super::*;
    use crate::domains::agents::models::{Agent, AgentType, NewAgent};
    use crate::domains::tasks::models::{AgentTask, TaskStatus};
    use crate::kernel::agent_roster::AgentRole;
    use crate::kernel::test_dependencies::{MockAgentRuntime, TestDependencies};
    use crate::kernel::{BaseAgentStore, BaseTaskStore, InMemoryStore};

    async fn queued_task(test: &TestDependencies, action: &str, parameters: serde_json::Value) -> TaskJob {
        let agent = Agent::from_new(NewAgent {
            name: "Matcher".into(),
            agent_type: AgentType::Matcher,
            description: None,
            parameters: None,
        })
        .unwrap();
        let agent = test.store.insert_agent(agent).await.unwrap();
        let task = test
            .store
            .insert_task(
                AgentTask::builder()
                    .agent_id(agent.id)
                    .action(action)
                    .parameters(parameters)
                    .build(),
            )
            .await
            .unwrap();
        TaskJob::from(&task)
    }

    fn handler(test: &TestDependencies) -> TaskJobHandler {
        TaskJobHandler::new(Arc::new(test.deps.clone()))
    }

    #[tokio::test]
    async fn success_completes_with_result() {
        let test = TestDependencies::with_runtime(
            MockAgentRuntime::new().with_response(AgentRole::Recruiter, "Interview"),
        );
        let job = queued_task(
            &test,
            "process_candidate",
            json!({"candidate_data": {"id": "c1", "name": "Ada"}}),
        )
        .await;

        handler(&test).handle(job.clone()).await.unwrap();

        let task = test.store.find_task(job.task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.result.as_ref().unwrap()["candidate_id"], "c1");
        assert!(task.error.is_none());
        assert!(task.started_at <= task.completed_at);

        let calls = test.runtime.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("\"c1\""));
    }

    #[tokio::test]
    async fn capability_error_is_recorded_as_failed() {
        let test = TestDependencies::with_runtime(MockAgentRuntime::new().failing("rate limited"));
        let job = queued_task(&test, "draft_outreach", json!({})).await;

        assert!(handler(&test).handle(job.clone()).await.is_err());

        let task = test.store.find_task(job.task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.as_deref().unwrap().contains("rate limited"));
        assert!(task.result.is_none());
        assert!(task.completed_at.is_some());
    }

    #[tokio::test]
    async fn slow_capability_times_out() {
        let test = TestDependencies::with_runtime(
            MockAgentRuntime::new().with_delay(AgentRole::Triage, Duration::from_millis(200)),
        )
        .task_timeout(Duration::from_millis(20));
        let job = queued_task(&test, "draft_outreach", json!({})).await;

        assert!(handler(&test).handle(job.clone()).await.is_err());

        let task = test.store.find_task(job.task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.error.as_deref().unwrap().contains("timed out"));
    }

    /// Delegates to the in-memory store but cannot persist results.
    struct UnwritableResults(Arc<InMemoryStore>);

    #[async_trait]
    impl BaseTaskStore for UnwritableResults {
        async fn insert_task(&self, task: AgentTask) -> Result<AgentTask> {
            self.0.insert_task(task).await
        }

        async fn find_task(&self, task_id: Uuid) -> Result<Option<AgentTask>> {
            self.0.find_task(task_id).await
        }

        async fn find_task_for_agent(
            &self,
            agent_id: Uuid,
            task_id: Uuid,
        ) -> Result<Option<AgentTask>> {
            self.0.find_task_for_agent(agent_id, task_id).await
        }

        async fn list_tasks_for_agent(&self, agent_id: Uuid) -> Result<Vec<AgentTask>> {
            self.0.list_tasks_for_agent(agent_id).await
        }

        async fn mark_running(&self, task_id: Uuid) -> Result<Option<AgentTask>> {
            self.0.mark_running(task_id).await
        }

        async fn mark_completed(&self, _task_id: Uuid, _result: Value) -> Result<Option<AgentTask>> {
            anyhow::bail!("connection reset")
        }

        async fn mark_failed(&self, task_id: Uuid, error: &str) -> Result<Option<AgentTask>> {
            self.0.mark_failed(task_id, error).await
        }
    }

    #[tokio::test]
    async fn unrecorded_result_still_ends_failed() {
        let test = TestDependencies::new();
        let job = queued_task(&test, "noop", json!({})).await;
        let deps = ServerDeps {
            tasks: Arc::new(UnwritableResults(test.store.clone())),
            ..test.deps.clone()
        };

        let err = TaskJobHandler::new(Arc::new(deps))
            .handle(job.clone())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection reset"));

        let task = test.store.find_task(job.task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.status.is_terminal());
        assert_eq!(
            task.error.as_deref(),
            Some("failed to record result: connection reset")
        );
        assert!(task.result.is_none());
        assert!(task.completed_at.is_some());
    }

    #[tokio::test]
    async fn duplicate_delivery_is_dropped() {
        let test = TestDependencies::new();
        let job = queued_task(&test, "draft_outreach", json!({})).await;
        let handler = handler(&test);

        handler.handle(job.clone()).await.unwrap();
        handler.handle(job.clone()).await.unwrap();

        assert_eq!(test.runtime.call_count(), 1);
        let task = test.store.find_task(job.task_id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn missing_task_is_ignored() {
        let test = TestDependencies::new();
        let job = TaskJob {
            task_id: Uuid::now_v7(),
            action: "noop".into(),
            parameters: json!({}),
            priority: 0,
            enqueued_at: chrono::Utc::now(),
        };

        handler(&test).handle(job).await.unwrap();
        assert_eq!(test.runtime.call_count(), 0);
    }
}
