//! Dashboard configuration.
//!
//! Loaded from an optional YAML file, then overridden from the environment:
//!
//! ```yaml
//! api_base_url: http://127.0.0.1:8000
//! poll_interval_ms: 1000
//! ```
//!
//! Missing fields fall back to [`DashboardConfig::default`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{PsError, PsResult};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Server-side bounds for history and export requests.
pub const MIN_YEARS: u32 = 1;
pub const MAX_YEARS: u32 = 15;
pub const MAX_COIN_LIMIT: u32 = 500;

pub const ENV_API_BASE_URL: &str = "PRICESCOPE_API_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "PRICESCOPE_POLL_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub default_years: u32,
    pub coin_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            default_years: 10,
            coin_limit: 200,
        }
    }
}

impl DashboardConfig {
    pub fn load_yaml(path: &Path) -> PsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> PsResult<Self> {
        let config: DashboardConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise start from defaults; then apply
    /// environment overrides.
    pub fn resolve(path: Option<&Path>) -> PsResult<Self> {
        let base = match path {
            Some(p) => Self::load_yaml(p)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    pub fn with_env_overrides(self) -> PsResult<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup and re-validate.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> PsResult<Self> {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = raw.trim().parse().map_err(|_| {
                PsError::Config(format!("{ENV_POLL_INTERVAL_MS} is not an integer: {raw}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> PsResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(PsError::Config("api_base_url must not be empty".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(PsError::Config("poll_interval_ms must be positive".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(PsError::Config("request_timeout_ms must be positive".into()));
        }
        if !(MIN_YEARS..=MAX_YEARS).contains(&self.default_years) {
            return Err(PsError::Config(format!(
                "default_years must be within {MIN_YEARS}..={MAX_YEARS}, got {}",
                self.default_years
            )));
        }
        if self.coin_limit == 0 || self.coin_limit > MAX_COIN_LIMIT {
            return Err(PsError::Config(format!(
                "coin_limit must be within 1..={MAX_COIN_LIMIT}, got {}",
                self.coin_limit
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Clamp a year count into the range the server accepts.
pub fn clamp_years(years: u32) -> u32 {
    years.clamp(MIN_YEARS, MAX_YEARS)
}
