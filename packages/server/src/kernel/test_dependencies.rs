// TestDependencies - mock implementations for testing
//
// Provides a scripted agent runtime that can be injected into ServerDeps for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::agent_roster::AgentRole;
use super::deps::{ServerDeps, DEFAULT_TASK_TIMEOUT};
use super::jobs::InMemoryJobQueue;
use super::stores::InMemoryStore;
use super::BaseAgentRuntime;

// =============================================================================
// Mock Agent Runtime
// =============================================================================

/// A single recorded `invoke` call.
#[derive(Debug, Clone)]
pub struct RuntimeCall {
    pub role: AgentRole,
    pub prompt: String,
}

/// Agent runtime that returns canned output and records every call.
///
/// Without a queued response, a role answers `"mock <role> output"`.
#[derive(Default)]
pub struct MockAgentRuntime {
    responses: Mutex<HashMap<AgentRole, VecDeque<Result<String, String>>>>,
    delays: Mutex<HashMap<AgentRole, Duration>>,
    failure: Mutex<Option<String>>,
    calls: Mutex<Vec<RuntimeCall>>,
}

impl MockAgentRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response for the next call to `role`.
    pub fn with_response(self, role: AgentRole, output: &str) -> Self {
        self.push(role, Ok(output.to_string()));
        self
    }

    /// Queue a failure for the next call to `role`.
    pub fn with_error(self, role: AgentRole, message: &str) -> Self {
        self.push(role, Err(message.to_string()));
        self
    }

    /// Make every call to `role` take at least `delay`.
    pub fn with_delay(self, role: AgentRole, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(role, delay);
        self
    }

    /// Fail every call with `message`.
    pub fn failing(self, message: &str) -> Self {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn was_invoked_with(&self, role: AgentRole) -> bool {
        self.calls().iter().any(|c| c.role == role)
    }

    fn push(&self, role: AgentRole, response: Result<String, String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(role)
            .or_default()
            .push_back(response);
    }
}

#[async_trait]
impl BaseAgentRuntime for MockAgentRuntime {
    async fn invoke(&self, role: AgentRole, prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RuntimeCall {
                role,
                prompt: prompt.to_string(),
            });

        let delay = self
            .delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&role)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failure.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            bail!(message);
        }

        let scripted = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&role)
            .and_then(|queue| queue.pop_front());

        match scripted {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => bail!(message),
            None => Ok(format!("mock {} output", role)),
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// In-memory [`ServerDeps`] wired to a [`MockAgentRuntime`].
pub struct TestDependencies {
    pub runtime: Arc<MockAgentRuntime>,
    pub store: Arc<InMemoryStore>,
    pub queue: Arc<InMemoryJobQueue>,
    pub deps: ServerDeps,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self::with_runtime(MockAgentRuntime::new())
    }

    pub fn with_runtime(runtime: MockAgentRuntime) -> Self {
        let runtime = Arc::new(runtime);
        let store = Arc::new(InMemoryStore::new());
        let queue = Arc::new(InMemoryJobQueue::new());
        let deps = ServerDeps::new(
            store.clone(),
            store.clone(),
            queue.clone(),
            runtime.clone(),
            DEFAULT_TASK_TIMEOUT,
        );
        Self {
            runtime,
            store,
            queue,
            deps,
        }
    }

    pub fn task_timeout(mut self, timeout: Duration) -> Self {
        self.deps.task_timeout = timeout;
        self
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
