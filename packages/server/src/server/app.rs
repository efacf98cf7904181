//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domains::tasks::effects::TaskJobHandler;
use crate::kernel::jobs::spawn_workers;
use crate::kernel::ServerDeps;
use crate::server::routes::{
    create_agent_handler, get_agent_handler, get_task_handler, health_handler,
    list_agents_handler, list_tasks_handler, process_candidate_handler, process_task_handler,
    root_handler, search_candidates_handler, submit_task_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub service_name: String,
}

impl AppState {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self {
            deps,
            service_name: "Purple Ladder AI Agents Platform".to_string(),
        }
    }
}

/// Build the Axum application router.
///
/// Everything except the welcome route lives under `/api/v1`.
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/agents", post(create_agent_handler).get(list_agents_handler))
        .route("/agents/:agent_id", get(get_agent_handler))
        .route(
            "/agents/:agent_id/tasks",
            post(submit_task_handler).get(list_tasks_handler),
        )
        .route("/agents/:agent_id/tasks/:task_id", get(get_task_handler))
        .route(
            "/agents-sdk/process-candidate",
            post(process_candidate_handler),
        )
        .route(
            "/agents-sdk/search-candidates",
            post(search_candidates_handler),
        )
        .route("/agents-sdk/process-task", post(process_task_handler));

    Router::new()
        .route("/", get(root_handler))
        .nest("/api/v1", api)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

/// Start the task worker pool against `deps`' queue.
pub fn start_task_workers(
    deps: Arc<ServerDeps>,
    concurrency: usize,
    poll_interval: Duration,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let handler = Arc::new(TaskJobHandler::new(deps.clone()));
    spawn_workers(
        concurrency,
        deps.queue.clone(),
        handler,
        poll_interval,
        shutdown,
    )
}
