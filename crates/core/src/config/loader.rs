use std::path::{Path, PathBuf};

use super::schema::WatchdogConfig;

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Validation(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("watchdog").join("config.yml");
    }
    PathBuf::from("/etc/watchdog/config.yml")
}

pub fn load_from_file(path: &Path) -> Result<WatchdogConfig, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}

pub fn load_from_str(yaml: &str) -> Result<WatchdogConfig, LoadError> {
    let cfg: WatchdogConfig = serde_yaml::from_str(yaml)?;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn validate(cfg: &WatchdogConfig) -> Result<(), LoadError> {
    if cfg.api.endpoint.trim().is_empty() {
        return Err(LoadError::Validation("api.endpoint must not be empty".into()));
    }
    if cfg.api.timeout_ms == 0 {
        return Err(LoadError::Validation("api.timeout_ms must be > 0".into()));
    }
    if cfg.heartbeat.interval_seconds == 0 {
        return Err(LoadError::Validation(
            "heartbeat.interval_seconds must be > 0".into(),
        ));
    }
    if !(0.0..=1.0).contains(&cfg.heartbeat.jitter_fraction) {
        return Err(LoadError::Validation(
            "heartbeat.jitter_fraction must be within [0, 1]".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config() {
        let yaml = r#"
api:
  endpoint: https://api.example.com/v1
heartbeat:
  interval_seconds: 15
"#;
        let cfg = load_from_str(yaml).unwrap();
        assert_eq!(cfg.api.endpoint, "https://api.example.com/v1");
        assert_eq!(cfg.heartbeat.interval_seconds, 15);
    }

    #[test]
    fn empty_endpoint_rejected() {
        let err = load_from_str("api:\n  endpoint: \"\"\n").unwrap_err();
        assert!(err.to_string().contains("api.endpoint"));
    }

    #[test]
    fn zero_interval_rejected() {
        let yaml = "api:\n  endpoint: https://x\nheartbeat:\n  interval_seconds: 0\n";
        let err = load_from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("interval_seconds"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let yaml = "api:\n  endpoint: https://x\n  timeout_ms: 0\n";
        let err = load_from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn jitter_out_of_range_rejected() {
        let yaml = "api:\n  endpoint: https://x\nheartbeat:\n  jitter_fraction: 1.5\n";
        let err = load_from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("jitter_fraction"));
    }

    #[test]
    fn missing_api_section_is_parse_error() {
        let err = load_from_str("heartbeat: {}\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn load_from_file_works() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "api:\n  endpoint: https://s\n").unwrap();
        let cfg = load_from_file(&path).unwrap();
        assert_eq!(cfg.api.endpoint, "https://s");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_from_file(Path::new("/nonexistent/watchdog.yml")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
