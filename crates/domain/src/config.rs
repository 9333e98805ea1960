//! Client configuration.
//!
//! Every field has a default so a partial (or absent) config file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Default time authority.
pub const DEFAULT_SERVER_URL: &str = "https://clock-socket.onrender.com";

/// Default base URL of the student records API.
pub const DEFAULT_RECORDS_URL: &str = "http://localhost:3000";

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Base URL of the time authority (http:// or https://).
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Base URL of the student records API.
    #[serde(default = "default_records_url")]
    pub records_url: String,
    /// Abort the baseline request after this many seconds.
    #[serde(default = "default_baseline_timeout")]
    pub baseline_timeout_secs: u64,
    /// Push channel connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Abort a records request after this many seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Start with the push subscription open.
    #[serde(default)]
    pub start_watching: bool,
    /// Reconnect behaviour for the push channel.
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            records_url: default_records_url(),
            baseline_timeout_secs: default_baseline_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            start_watching: false,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_records_url() -> String {
    DEFAULT_RECORDS_URL.to_string()
}

const fn default_baseline_timeout() -> u64 {
    10
}

const fn default_connect_timeout() -> u64 {
    30
}

const fn default_request_timeout() -> u64 {
    30
}

impl ClockConfig {
    /// Create a configuration pointing at the given time authority.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Default::default()
        }
    }

    /// Set the records API base URL.
    #[must_use]
    pub fn with_records_url(mut self, url: impl Into<String>) -> Self {
        self.records_url = url.into();
        self
    }

    /// Set the reconnect policy.
    #[must_use]
    pub const fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Get the baseline timeout as Duration.
    #[must_use]
    pub const fn baseline_timeout(&self) -> Duration {
        Duration::from_secs(self.baseline_timeout_secs)
    }

    /// Get the connect timeout as Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Get the records request timeout as Duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for malformed URLs or zero timeouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("server_url", &self.server_url)?;
        validate_http_url("records_url", &self.records_url)?;
        if self.baseline_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("baseline_timeout_secs"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("connect_timeout_secs"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("request_timeout_secs"));
        }
        Ok(())
    }
}

fn validate_http_url(field: &'static str, raw: &str) -> Result<(), ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::InvalidUrl {
            field,
            reason: "URL cannot be empty".to_string(),
        });
    }
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            field,
            reason: format!("URL must start with http:// or https://, got {other}://"),
        }),
    }
}

/// Reconnect-with-backoff policy for the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Enable automatic reconnection.
    #[serde(default)]
    pub enabled: bool,
    /// Maximum reconnection attempts (0 for unlimited).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    /// Upper bound for the delay, in milliseconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    /// Randomize each delay to spread reconnects out.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            jitter: default_jitter(),
        }
    }
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_initial_backoff() -> u64 {
    500
}

const fn default_max_backoff() -> u64 {
    10_000
}

const fn default_jitter() -> bool {
    true
}

impl ReconnectPolicy {
    /// A policy that never reconnects.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A policy that reconnects with the given bounds and no jitter.
    #[must_use]
    pub const fn exponential(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            enabled: true,
            max_attempts,
            initial_backoff_ms,
            max_backoff_ms,
            jitter: false,
        }
    }

    /// Delay before retry number `attempt` (zero-based), before jitter.
    ///
    /// Returns `None` when reconnecting is disabled or attempts are exhausted.
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        if self.max_attempts != 0 && attempt >= self.max_attempts {
            return None;
        }
        let factor = 1u64.checked_shl(attempt.min(63)).unwrap_or(u64::MAX);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Some(Duration::from_millis(ms))
    }
}
