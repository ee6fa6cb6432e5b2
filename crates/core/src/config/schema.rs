use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WatchdogConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiConfig {
    pub endpoint: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HeartbeatConfig {
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    #[serde(default = "default_jitter")]
    pub jitter_fraction: f64,
    #[serde(default = "yes")]
    pub stop_on_triggered: bool,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            jitter_fraction: default_jitter(),
            stop_on_triggered: true,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl HeartbeatConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl WatchdogConfig {
    /// Defaults everywhere except the endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                endpoint: endpoint.into(),
                token: None,
                timeout_ms: default_timeout_ms(),
            },
            heartbeat: HeartbeatConfig::default(),
        }
    }

    /// Copy of the config safe to print.
    pub fn redacted(&self) -> Self {
        let mut c = self.clone();
        if c.api.token.is_some() {
            c.api.token = Some("<redacted>".into());
        }
        c
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_interval() -> u64 {
    60
}

fn default_jitter() -> f64 {
    0.1
}

fn yes() -> bool {
    true
}
