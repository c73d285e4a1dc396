//! Configuration types for folio-feed

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the provider API key
pub const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub align: AlignConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Upstream provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for the query API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.alphavantage.co".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

/// Retry and failure-budget configuration for batch retrieval
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Attempts per symbol for monthly retrieval
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed wait between attempts, in seconds
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    /// Minimum observations for a monthly series to count as valid
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
    /// Failed symbols tolerated in a monthly batch before aborting
    #[serde(default = "default_monthly_failure_budget")]
    pub monthly_failure_budget: usize,
    /// Failed symbols tolerated in a weekly batch before aborting
    #[serde(default = "default_weekly_failure_budget")]
    pub weekly_failure_budget: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff_secs(),
            min_observations: default_min_observations(),
            monthly_failure_budget: default_monthly_failure_budget(),
            weekly_failure_budget: default_weekly_failure_budget(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_secs() -> u64 {
    5
}
fn default_min_observations() -> usize {
    2
}
fn default_monthly_failure_budget() -> usize {
    5
}
fn default_weekly_failure_budget() -> usize {
    3
}

/// Alignment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AlignConfig {
    /// Monthly periods required from the store path
    #[serde(default = "default_required_months")]
    pub required_months: usize,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            required_months: default_required_months(),
        }
    }
}

fn default_required_months() -> usize {
    60
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Port for the Prometheus exporter; disabled when absent
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The provider API key is not present in the environment
    #[error("ALPHAVANTAGE_API_KEY environment variable not set")]
    MissingApiKey,
}

/// Process credentials, read once at startup and passed by reference
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Wrap an explicit key (tests, embedded callers)
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Read the API key from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => Ok(Self { api_key: key }),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
