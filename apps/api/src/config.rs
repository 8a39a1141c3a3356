use anyhow::{Context, Result};

use crate::engine::provider::InitRetryPolicy;

/// Application configuration loaded from environment variables.
/// Every variable has a default, so the service starts with no environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional bearer token for the hosted inference API.
    pub hf_api_token: Option<String>,
    /// When true, a failed engine initialization is cached and every later
    /// request fails fast. When false, the next request retries.
    pub cache_init_failure: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            hf_api_token: std::env::var("HF_API_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
            cache_init_failure: std::env::var("CACHE_INIT_FAILURE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn init_retry_policy(&self) -> InitRetryPolicy {
        if self.cache_init_failure {
            InitRetryPolicy::CacheFailure
        } else {
            InitRetryPolicy::RetryNextRequest
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_cache(cache_init_failure: bool) -> Config {
        Config {
            hf_api_token: None,
            cache_init_failure,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_retry_policy_defaults_to_retry_next_request() {
        let config = config_with_cache(false);
        assert_eq!(
            config.init_retry_policy(),
            InitRetryPolicy::RetryNextRequest
        );
    }

    #[test]
    fn test_retry_policy_cache_failure_when_configured() {
        let config = config_with_cache(true);
        assert_eq!(config.init_retry_policy(), InitRetryPolicy::CacheFailure);
    }
}
