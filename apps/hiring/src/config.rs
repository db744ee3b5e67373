use std::time::Duration;

use anyhow::{Context, Result};

/// Configuration loaded from environment variables (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the console's REST API, e.g. `https://console.example.com`.
    pub record_store_url: String,
    /// Bearer token sent with every record-store call.
    pub record_store_token: String,
    /// Per-request timeout. Each dispatched call gets its own budget.
    pub request_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            record_store_url: require_env("RECORD_STORE_URL")?,
            record_store_token: require_env("RECORD_STORE_TOKEN")?,
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
