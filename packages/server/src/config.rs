use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// When unset the server runs against the in-memory store and queue.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: String,
    pub allowed_origins: Vec<String>,
    pub worker_concurrency: usize,
    pub worker_poll_interval: Duration,
    pub task_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            port: parse_or("PORT", 8000)?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_else(|_| default_origins()),
            worker_concurrency: parse_or("WORKER_CONCURRENCY", 4)?,
            worker_poll_interval: Duration::from_millis(parse_or("WORKER_POLL_INTERVAL_MS", 500)?),
            task_timeout: Duration::from_secs(parse_or("TASK_TIMEOUT_SECS", 300)?),
        })
    }
}

fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}

/// Accepts `a,b`, `"a,b"` and a single origin.
pub fn parse_origins(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);

    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
        "http://localhost:8000".to_string(),
    ]
}
