//! In-process API client.
//!
//! Builds the real router and worker pool on the in-memory backend and
//! drives it with `tower::ServiceExt::oneshot`, so no socket or database is
//! needed.

use std::sync::Arc;
use std::time::Duration;

use agents_core::kernel::{MockAgentRuntime, TestDependencies};
use agents_core::server::{build_app, start_task_workers, AppState};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub test: TestDependencies,
    router: Router,
    shutdown: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl TestApp {
    pub fn start(runtime: MockAgentRuntime) -> Self {
        Self::from_deps(TestDependencies::with_runtime(runtime))
    }

    pub fn from_deps(test: TestDependencies) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let deps = Arc::new(test.deps.clone());
        let shutdown = CancellationToken::new();
        let workers =
            start_task_workers(deps.clone(), 4, Duration::from_millis(5), shutdown.clone());
        let router = build_app(AppState::new(deps), &["http://localhost:3000".to_string()]);

        Self {
            test,
            router,
            shutdown,
            workers,
        }
    }

    /// App without a worker pool; submitted tasks stay queued.
    pub fn without_workers(runtime: MockAgentRuntime) -> Self {
        let test = TestDependencies::with_runtime(runtime);
        let deps = Arc::new(test.deps.clone());
        let router = build_app(AppState::new(deps), &[]);

        Self {
            test,
            router,
            shutdown: CancellationToken::new(),
            workers: Vec::new(),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn create_agent(&self, name: &str, agent_type: &str) -> Uuid {
        let (status, body) = self
            .post("/api/v1/agents", json!({ "name": name, "type": agent_type }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create agent failed: {}", body);
        serde_json::from_value(body["id"].clone()).expect("agent id")
    }

    pub async fn submit(&self, agent_id: Uuid, action: &str, parameters: Value) -> (StatusCode, Value) {
        self.post(
            &format!("/api/v1/agents/{}/tasks", agent_id),
            json!({ "action": action, "parameters": parameters }),
        )
        .await
    }

    pub async fn submit_ok(&self, agent_id: Uuid, action: &str, parameters: Value) -> Uuid {
        let (status, body) = self.submit(agent_id, action, parameters).await;
        assert_eq!(status, StatusCode::OK, "submit failed: {}", body);
        assert_eq!(body["status"], "queued");
        serde_json::from_value(body["task_id"].clone()).expect("task id")
    }

    pub async fn task(&self, agent_id: Uuid, task_id: Uuid) -> (StatusCode, Value) {
        self.get(&format!("/api/v1/agents/{}/tasks/{}", agent_id, task_id))
            .await
    }

    /// Poll until the task is `completed` or `failed`.
    pub async fn wait_for_terminal(&self, agent_id: Uuid, task_id: Uuid) -> Value {
        for _ in 0..500 {
            let (status, body) = self.task(agent_id, task_id).await;
            assert_eq!(status, StatusCode::OK, "poll failed: {}", body);
            if body["status"] == "completed" || body["status"] == "failed" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} did not reach a terminal state", task_id);
    }

    pub async fn stop(mut self) {
        self.shutdown.cancel();
        for worker in self.workers.drain(..) {
            let _ = worker.await;
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
