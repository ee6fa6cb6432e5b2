mod loader;
mod schema;

pub use loader::{default_config_path, load_from_file, load_from_str, validate, LoadError};
pub use schema::{ApiConfig, HeartbeatConfig, WatchdogConfig};
