use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Installs the global `tracing` subscriber. `RUST_LOG` from the environment
/// wins; otherwise the crate logs at `config.rust_log`.
/// Returns false if a subscriber was already installed.
pub fn init_tracing(config: &Config) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let config = Config {
            record_store_url: "http://localhost".to_string(),
            record_store_token: "t".to_string(),
            request_timeout_secs: 1,
            rust_log: "debug".to_string(),
        };
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
