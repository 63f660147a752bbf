use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Origin of the backend, e.g. `"https://edificio.example.com"`.
    pub base_url: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Substring that marks the current view as an authenticated area. An
    /// unauthorized response only clears the session when the active path
    /// contains this marker — public pages that merely probe an endpoint
    /// must not trigger a redirect loop.
    #[serde(default = "default_dashboard_marker")]
    pub dashboard_marker: String,
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChannelConfig {
    /// Explicit live-channel endpoint. When unset, derived from
    /// `api.base_url` (scheme-upgraded to `ws`/`wss`).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_updates_path")]
    pub updates_path: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    /// Optional JSON file the session store writes through to. Unset means
    /// the session lives only as long as the process.
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ApiConfig {
    /// Absolute URL for a relative endpoint path.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl ChannelConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl ClientConfig {
    /// Resolve the live-channel endpoint: the explicit `channel.url` wins,
    /// otherwise the secure/live variant of the base URL + the dashboard
    /// socket path.
    ///
    /// Returns `None` when neither yields a usable `ws`/`wss` URL; the
    /// client treats that as "channel disabled, polling only".
    pub fn websocket_url(&self) -> Option<String> {
        if let Some(url) = &self.channel.url {
            return Some(url.clone());
        }
        let base = self.api.base_url.trim_end_matches('/');
        let origin = base
            .strip_prefix("https://")
            .map(|rest| format!("wss://{}", rest))
            .or_else(|| {
                base.strip_prefix("http://")
                    .map(|rest| format!("ws://{}", rest))
            })?;
        Some(format!("{}/ws/dashboard/", origin))
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: None,
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            updates_path: default_updates_path(),
        }
    }
}

pub fn default_login_path() -> String {
    "/login".to_string()
}

pub fn default_dashboard_marker() -> String {
    "dashboard".to_string()
}

pub fn default_redirect_delay_ms() -> u64 {
    2000
}

pub fn default_retry_backoff_ms() -> u64 {
    1000
}

pub fn default_reconnect_delay_ms() -> u64 {
    5000
}

pub fn default_poll_interval_ms() -> u64 {
    30_000
}

pub fn default_updates_path() -> String {
    "/api/updates/".to_string()
}
