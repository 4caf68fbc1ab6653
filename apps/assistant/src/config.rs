use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_RECONNECT_DELAY_MS: u64 = 1000;
const DEFAULT_TRANSPORT_RETRY_DELAY_MS: u64 = 2000;
const DEFAULT_MAX_TRANSPORT_RETRIES: u32 = 5;
const DEFAULT_MAX_AUTH_RENEWALS: u32 = 3;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, e.g. `http://localhost:8000`. No trailing slash.
    pub api_base_url: String,
    pub retry: RetryPolicy,
    pub connect_timeout: Duration,
    pub rust_log: String,
}

/// Backoff and cap settings for the two automatically recovered failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before reconnecting after the backend rejects an expired credential.
    pub reconnect_delay: Duration,
    /// Delay before retrying after a network-level failure.
    pub transport_retry_delay: Duration,
    /// Consecutive transport failures tolerated before the request fails.
    pub max_transport_retries: u32,
    /// Consecutive credential renewals tolerated before the request fails.
    pub max_auth_renewals: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            transport_retry_delay: Duration::from_millis(DEFAULT_TRANSPORT_RETRY_DELAY_MS),
            max_transport_retries: DEFAULT_MAX_TRANSPORT_RETRIES,
            max_auth_renewals: DEFAULT_MAX_AUTH_RENEWALS,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `api_base_url` with every other setting at its default.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(&api_base_url.into()),
            retry: RetryPolicy::default(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            rust_log: "info".to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(ClientConfig {
            api_base_url: normalize_base_url(&require_env("ASSISTANT_API_BASE_URL")?),
            retry: RetryPolicy {
                reconnect_delay: Duration::from_millis(parse_env(
                    "ASSISTANT_RECONNECT_DELAY_MS",
                    DEFAULT_RECONNECT_DELAY_MS,
                )?),
                transport_retry_delay: Duration::from_millis(parse_env(
                    "ASSISTANT_TRANSPORT_RETRY_DELAY_MS",
                    DEFAULT_TRANSPORT_RETRY_DELAY_MS,
                )?),
                max_transport_retries: parse_env(
                    "ASSISTANT_MAX_TRANSPORT_RETRIES",
                    DEFAULT_MAX_TRANSPORT_RETRIES,
                )?,
                max_auth_renewals: parse_env(
                    "ASSISTANT_MAX_AUTH_RENEWALS",
                    DEFAULT_MAX_AUTH_RENEWALS,
                )?,
            },
            connect_timeout: Duration::from_secs(parse_env(
                "ASSISTANT_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Joins an endpoint path onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
