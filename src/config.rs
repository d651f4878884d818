//! Console configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::net::HttpTimeouts;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_STATE_DIR: &str = ".rentdesk";
pub const DEFAULT_WATCHDOG_LEAD_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_url: String,
    pub state_dir: PathBuf,
    pub watchdog_lead_secs: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl ConsoleConfig {
    /// Build typed console config from environment variables.
    ///
    /// Optional:
    /// - `RENTDESK_API_URL`: backend base URL, default `http://127.0.0.1:5000/api`
    /// - `RENTDESK_STATE_DIR`: where the session pair is persisted, default `.rentdesk`
    /// - `RENTDESK_WATCHDOG_LEAD_SECS`: default 60
    /// - `RENTDESK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `RENTDESK_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNumber`] when a numeric variable is set
    /// but does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNumber`] on an unparseable number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("RENTDESK_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let state_dir = lookup("RENTDESK_STATE_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);

        Ok(Self {
            api_url: normalize_url(&api_url),
            state_dir,
            watchdog_lead_secs: env_parse(&lookup, "RENTDESK_WATCHDOG_LEAD_SECS", DEFAULT_WATCHDOG_LEAD_SECS)?,
            request_timeout_secs: env_parse(&lookup, "RENTDESK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_timeout_secs: env_parse(&lookup, "RENTDESK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        })
    }

    /// Apply command-line overrides on top of the environment.
    #[must_use]
    pub fn with_overrides(mut self, api_url: Option<String>, state_dir: Option<PathBuf>) -> Self {
        if let Some(url) = api_url {
            self.api_url = normalize_url(&url);
        }
        if let Some(dir) = state_dir {
            self.state_dir = dir;
        }
        self
    }

    #[must_use]
    pub fn watchdog_lead(&self) -> Duration {
        Duration::from_secs(self.watchdog_lead_secs)
    }

    #[must_use]
    pub fn http_timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            request: Duration::from_secs(self.request_timeout_secs),
            connect: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}

fn normalize_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn env_parse(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
