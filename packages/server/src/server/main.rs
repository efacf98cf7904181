// Main entry point for API server

use std::sync::Arc;

use agents_core::kernel::{AgentRoster, OpenAIAgentRuntime, ServerDeps};
use agents_core::server::{build_app, start_task_workers, AppState};
use agents_core::Config;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agents_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Purple Ladder AI Agents API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Agents are built once here and shared by reference for the process lifetime
    let roster = AgentRoster::new(&config.openai_model);
    let runtime = Arc::new(OpenAIAgentRuntime::new(&config.openai_api_key, &roster));

    let deps = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations complete");

            ServerDeps::postgres(pool, runtime)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (state is lost on exit)");
            ServerDeps::in_memory(runtime)
        }
    };
    let deps = Arc::new(deps.with_task_timeout(config.task_timeout));

    // Worker pool
    let shutdown = CancellationToken::new();
    let workers = start_task_workers(
        deps.clone(),
        config.worker_concurrency,
        config.worker_poll_interval,
        shutdown.clone(),
    );
    tracing::info!(workers = workers.len(), "Task workers started");

    let app = build_app(AppState::new(deps), &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/api/v1/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Let in-flight tasks finish before exiting
    tracing::info!("Stopping task workers...");
    shutdown.cancel();
    for result in futures::future::join_all(workers).await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Task worker panicked");
        }
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
