use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use watchdog_core::alert::{AlertError, Metadata};
use watchdog_core::config::{self, LoadError, WatchdogConfig};
use watchdog_core::identity::require_token;
use watchdog_core::transport::HttpTransport;
use watchdog_core::WatchdogOrchestrator;

pub fn resolve_config_path(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path)
}

/// Loads the config file and applies `--server`. A missing file is fine
/// when `--server` supplies the one required setting.
pub fn load_config(config_path: Option<&str>, server: Option<&str>) -> Result<WatchdogConfig> {
    let path = resolve_config_path(config_path);

    let mut cfg = match (config::load_from_file(&path), server) {
        (Ok(cfg), _) => cfg,
        (Err(LoadError::Io(e)), Some(s)) if e.kind() == ErrorKind::NotFound => {
            WatchdogConfig::with_endpoint(s)
        }
        (Err(e), _) => {
            return Err(e).with_context(|| format!("loading config from {}", path.display()))
        }
    };

    if let Some(s) = server {
        cfg.api.endpoint = s.to_string();
        config::validate(&cfg).context("invalid --server")?;
    }
    Ok(cfg)
}

pub struct Session {
    pub config: WatchdogConfig,
    pub orchestrator: WatchdogOrchestrator<HttpTransport>,
}

pub fn connect(server: Option<&str>, config_path: Option<&str>) -> Result<Session> {
    let config = load_config(config_path, server)?;
    let token = require_token(&config)?;

    let transport = Arc::new(HttpTransport::new(&config.api.endpoint, token.expose()));
    let orchestrator =
        WatchdogOrchestrator::new(transport).with_timeout(config.api.timeout());

    tracing::debug!(endpoint = %config.api.endpoint, "alert API configured");
    Ok(Session {
        config,
        orchestrator,
    })
}

/// `key=value`. The value is taken as JSON when it parses, else as a string.
pub fn parse_meta_pair(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

pub fn collect_meta(pairs: Vec<(String, Value)>) -> Metadata {
    pairs.into_iter().collect()
}

/// Wraps an alert failure with the hint the user should act on.
pub fn explain(err: AlertError) -> anyhow::Error {
    let hint = match &err {
        AlertError::NotFound { .. } => "alert not found; the stored uuid may be stale",
        AlertError::AccessDenied(_) => "the configured token does not own this alert",
        AlertError::AlreadyTriggered { .. } => "alert already triggered",
        AlertError::Request(_) => "request to the alert API failed",
        AlertError::AlreadyBound { .. } => "alert client reused",
    };
    anyhow::Error::new(err).context(hint)
}
