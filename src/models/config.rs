//! Application configuration structures.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding `api.base_url`.
pub const ENV_BASE_URL: &str = "CONTENT_API_BASE_URL";
/// Environment variable overriding `api.timeout_ms`.
pub const ENV_TIMEOUT_MS: &str = "CONTENT_API_TIMEOUT_MS";
/// Environment variable overriding `api.retry_attempts`.
pub const ENV_RETRY_ATTEMPTS: &str = "CONTENT_API_RETRY_ATTEMPTS";
/// Environment variable overriding `cache.ttl_secs`.
pub const ENV_CACHE_TTL_SECS: &str = "CONTENT_CACHE_TTL_SECS";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Shared HTTP client settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Per-domain overrides keyed by domain name (`events`, `news`, ...)
    #[serde(default)]
    pub endpoints: HashMap<String, EndpointOverride>,

    /// Store cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Error-handler retry defaults
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.api.base_url = url;
        }
        if let Some(ms) = lookup(ENV_TIMEOUT_MS).and_then(|v| v.parse().ok()) {
            self.api.timeout_ms = ms;
        }
        if let Some(n) = lookup(ENV_RETRY_ATTEMPTS).and_then(|v| v.parse().ok()) {
            self.api.retry_attempts = n;
        }
        if let Some(secs) = lookup(ENV_CACHE_TTL_SECS).and_then(|v| v.parse().ok()) {
            self.cache.ttl_secs = secs;
        }
    }

    /// Resolve the effective endpoint settings for a domain.
    pub fn endpoint(&self, domain: &str) -> EndpointConfig {
        let over = self.endpoints.get(domain);
        EndpointConfig {
            base_url: over
                .and_then(|o| o.base_url.clone())
                .unwrap_or_else(|| self.api.base_url.clone()),
            timeout_ms: over
                .and_then(|o| o.timeout_ms)
                .unwrap_or(self.api.timeout_ms),
            retry_attempts: over
                .and_then(|o| o.retry_attempts)
                .unwrap_or(self.api.retry_attempts),
            retry_delay_ms: self.api.retry_delay_ms,
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_ms == 0 {
            return Err(AppError::validation("api.timeout_ms must be > 0"));
        }
        if self.api.retry_attempts == 0 {
            return Err(AppError::validation("api.retry_attempts must be > 0"));
        }
        for (domain, over) in &self.endpoints {
            if let Some(url) = &over.base_url {
                url::Url::parse(url).map_err(|e| {
                    AppError::validation(format!("endpoints.{domain}.base_url: {e}"))
                })?;
            }
            if over.timeout_ms == Some(0) {
                return Err(AppError::validation(format!(
                    "endpoints.{domain}.timeout_ms must be > 0"
                )));
            }
        }
        if self.cache.ttl_secs == 0 {
            return Err(AppError::validation("cache.ttl_secs must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        if self.retry.backoff_factor < 1.0 {
            return Err(AppError::validation("retry.backoff_factor must be >= 1.0"));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(AppError::validation(
                "retry.max_delay_ms must be >= retry.base_delay_ms",
            ));
        }
        Ok(())
    }
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin, e.g. `https://content.example.org`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "defaults::timeout_ms")]
    pub timeout_ms: u64,

    /// Total attempts for idempotent requests
    #[serde(default = "defaults::retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between transport-level retries
    #[serde(default = "defaults::retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            timeout_ms: defaults::timeout_ms(),
            retry_attempts: defaults::retry_attempts(),
            retry_delay_ms: defaults::retry_delay_ms(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Optional per-domain settings; unset fields inherit from `[api]`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EndpointOverride {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub retry_attempts: Option<u32>,
}

/// Fully resolved settings for one REST client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Config::default().endpoint("")
    }
}

/// Store cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a cached fetch in seconds
    #[serde(default = "defaults::ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::ttl_secs(),
        }
    }
}

/// Defaults for the exponential-backoff error handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "defaults::base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "defaults::max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "defaults::backoff_factor")]
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            base_delay_ms: defaults::base_delay_ms(),
            max_delay_ms: defaults::max_delay_ms(),
            backoff_factor: defaults::backoff_factor(),
        }
    }
}

mod defaults {
    // API defaults
    pub fn base_url() -> String {
        "http://localhost:8000".into()
    }
    pub fn timeout_ms() -> u64 {
        10_000
    }
    pub fn retry_attempts() -> u32 {
        3
    }
    pub fn retry_delay_ms() -> u64 {
        1_000
    }
    pub fn user_agent() -> String {
        concat!("content-client/", env!("CARGO_PKG_VERSION")).into()
    }

    // Cache defaults
    pub fn ttl_secs() -> u64 {
        300
    }

    // Retry defaults
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn base_delay_ms() -> u64 {
        1_000
    }
    pub fn max_delay_ms() -> u64 {
        10_000
    }
    pub fn backoff_factor() -> f64 {
        2.0
    }
}
