//! Synchronous capability calls that bypass the task queue.
//!
//! Nothing is recorded; the caller waits for the hosted agent and gets its
//! shaped result back directly.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::common::{ServiceError, ServiceResult};
use crate::domains::tasks::models::TaskAction;
use crate::kernel::ServerDeps;

/// Body of `POST /agents-sdk/process-task`.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectTaskRequest {
    #[serde(default)]
    pub task_id: Option<Uuid>,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default = "empty_object")]
    pub parameters: Value,
}

fn default_action() -> String {
    "process".to_string()
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Run `action` now, bounded by the same timeout as queued tasks.
pub async fn run_direct(
    task_id: Uuid,
    action: TaskAction,
    deps: &ServerDeps,
) -> ServiceResult<Value> {
    let outcome =
        tokio::time::timeout(deps.task_timeout, action.run(task_id, deps.runtime.as_ref())).await;

    match outcome {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => {
            warn!(action = %action.name(), error = %e, "Direct agent call failed");
            Err(ServiceError::ExternalCapability(format!(
                "Error running {}: {:#}",
                action.name(),
                e
            )))
        }
        Err(_) => Err(ServiceError::ExternalCapability(format!(
            "{} timed out after {}s",
            action.name(),
            deps.task_timeout.as_secs_f64()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::agent_roster::AgentRole;
    use crate::kernel::test_dependencies::{MockAgentRuntime, TestDependencies};
    use serde_json::json;

    #[tokio::test]
    async fn search_result_is_returned_without_a_record() {
        let test = TestDependencies::with_runtime(
            MockAgentRuntime::new().with_response(AgentRole::Search, "1. Ada (92)"),
        );
        let action = TaskAction::parse(
            "search_candidates",
            &json!({"job_requirements": {"job_id": "j9", "title": "SRE"}}),
        )
        .unwrap();

        let result = run_direct(Uuid::now_v7(), action, &test.deps).await.unwrap();

        assert_eq!(result["search_results"], "1. Ada (92)");
        assert_eq!(result["job_id"], "j9");
        assert_eq!(test.store.task_count(), 0);
    }

    #[tokio::test]
    async fn runtime_failure_is_an_external_capability_error() {
        let test = TestDependencies::with_runtime(MockAgentRuntime::new().failing("bad key"));
        let action = TaskAction::triage("process", &json!({})).unwrap();

        let err = run_direct(Uuid::now_v7(), action, &test.deps).await.unwrap_err();

        assert!(matches!(err, ServiceError::ExternalCapability(_)));
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn process_task_body_has_defaults() {
        let request: DirectTaskRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.action, "process");
        assert_eq!(request.parameters, json!({}));
        assert!(request.task_id.is_none());
    }
}
