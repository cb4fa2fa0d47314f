//! Client configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use udhaar_lifecycle::LoanPolicy;

use crate::fixture::Latency;
use crate::ClientError;

/// Which backend the client talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Always the REST server.
    Live,
    /// Always the in-memory fixture.
    Demo,
    /// Demo when the stored session is a demo session, live otherwise.
    #[default]
    Auto,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::Demo => "demo",
            Self::Auto => "auto",
        })
    }
}

impl FromStr for BackendMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "demo" => Ok(Self::Demo),
            "auto" => Ok(Self::Auto),
            other => Err(ClientError::Config(format!(
                "unknown backend mode `{other}` (expected live, demo or auto)"
            ))),
        }
    }
}

/// Configuration for the Udhaar client.
///
/// Can be loaded from a TOML file via [`ClientConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub mode: BackendMode,

    /// Base URL of the REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// File holding the stored token and user.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Lower bound of the simulated demo delay.
    #[serde(default = "default_demo_latency_min_ms")]
    pub demo_latency_min_ms: u64,

    #[serde(default = "default_demo_latency_max_ms")]
    pub demo_latency_max_ms: u64,

    /// How often the unread notification count is refreshed.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Bounds enforced on loan requests before they are sent.
    #[serde(default)]
    pub loan_policy: LoanPolicy,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_api_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./udhaar_data/session.json")
}

fn default_demo_latency_min_ms() -> u64 {
    300
}

fn default_demo_latency_max_ms() -> u64 {
    500
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ClientError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ClientError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ClientError> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ClientError> {
        toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn demo_latency(&self) -> Latency {
        Latency::new(
            Duration::from_millis(self.demo_latency_min_ms),
            Duration::from_millis(self.demo_latency_max_ms),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            storage_path: default_storage_path(),
            demo_latency_min_ms: default_demo_latency_min_ms(),
            demo_latency_max_ms: default_demo_latency_max_ms(),
            poll_interval_secs: default_poll_interval_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            loan_policy: LoanPolicy::default(),
        }
    }
}
