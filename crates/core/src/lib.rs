pub mod alert;
pub mod client;
pub mod config;
pub mod identity;
pub mod orchestrator;
pub mod scheduler;
pub mod transport;

pub use alert::{AlertError, AlertPhase, AlertState, Metadata};
pub use client::AlertClient;
pub use orchestrator::{FireOutcome, HeartbeatStatus, WatchdogError, WatchdogOrchestrator};
pub use transport::{AlertTransport, HttpTransport, InMemoryAuthority};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
