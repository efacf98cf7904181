use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    api_version: String,
    service: String,
    store: StoreHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    queue_depth: Option<i64>,
}

#[derive(Serialize)]
pub struct StoreHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Checks store connectivity (bounded at 5s) and reports the number of
/// queued jobs. Returns 200 OK when the store answers, 503 otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store = match tokio::time::timeout(Duration::from_secs(5), state.deps.tasks.ping()).await {
        Ok(Ok(())) => StoreHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => StoreHealth {
            status: "error".to_string(),
            error: Some(format!("Ping failed: {}", e)),
        },
        Err(_) => StoreHealth {
            status: "error".to_string(),
            error: Some("Ping timeout (>5s)".to_string()),
        },
    };

    let queue_depth = state.deps.queue.depth().await.ok();

    let is_healthy = store.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            api_version: "v1".to_string(),
            service: state.service_name.clone(),
            store,
            queue_depth,
        }),
    )
}

pub async fn root_handler(Extension(state): Extension<AppState>) -> Json<Value> {
    Json(json!({
        "message": format!("Welcome to {} API", state.service_name),
        "health": "/api/v1/health",
    }))
}
