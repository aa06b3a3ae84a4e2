//! Runtime configuration read from the environment at start-up

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    API_BASE_ENV, APP_NAME, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, TIMEOUT_ENV,
};
use crate::error::{ApiError, Result};

/// Client configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// API root without a trailing slash, e.g. `http://localhost:8000`
    pub api_base: String,
    pub timeout: Duration,
}

impl Config {
    /// Build a config from `PROJDECK_API_BASE` and `PROJDECK_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            std::env::var(API_BASE_ENV).ok().as_deref(),
            std::env::var(TIMEOUT_ENV).ok().as_deref(),
        )
    }

    pub fn from_values(api_base: Option<&str>, timeout_secs: Option<&str>) -> Result<Self> {
        let raw = api_base
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_API_BASE);

        reqwest::Url::parse(raw).map_err(|e| ApiError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        let timeout = match timeout_secs {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(value, "Ignoring invalid {TIMEOUT_ENV}");
                    DEFAULT_TIMEOUT_SECS
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            api_base: raw.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout),
        })
    }

    /// Where the log file goes: the user cache dir, or the working directory.
    pub fn log_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
