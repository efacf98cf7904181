//! PostgreSQL test harness.
//!
//! One testcontainers Postgres is started lazily for the whole test binary
//! and migrated once; every harness opens its own pool against it.

use std::sync::Arc;

use agents_core::kernel::{MockAgentRuntime, ServerDeps};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct SharedPostgres {
    url: String,
    _container: ContainerAsync<Postgres>,
}

static SHARED_POSTGRES: OnceCell<SharedPostgres> = OnceCell::const_new();

async fn start_postgres() -> Result<SharedPostgres> {
    // RUST_LOG=debug cargo test --test postgres_store_tests -- --ignored --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let container = Postgres::default()
        .with_tag("16-alpine")
        .start()
        .await
        .context("Failed to start Postgres container")?;

    let url = format!(
        "postgresql://postgres:postgres@{}:{}/postgres",
        container.get_host().await?,
        container.get_host_port_ipv4(5432).await?
    );

    let pool = PgPool::connect(&url)
        .await
        .context("Failed to connect for migrations")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    pool.close().await;

    Ok(SharedPostgres {
        url,
        _container: container,
    })
}

/// Postgres-backed [`ServerDeps`] with a scripted agent runtime.
pub struct TestHarness {
    pub db_pool: PgPool,
    pub runtime: Arc<MockAgentRuntime>,
    pub deps: ServerDeps,
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let shared = SHARED_POSTGRES
            .get_or_try_init(start_postgres)
            .await
            .context("Shared Postgres unavailable")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&shared.url)
            .await
            .context("Failed to connect to test database")?;

        let runtime = Arc::new(MockAgentRuntime::new());
        let deps = ServerDeps::postgres(db_pool.clone(), runtime.clone());

        Ok(Self {
            db_pool,
            runtime,
            deps,
        })
    }
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}
