mod heartbeat;
mod jitter;

pub use heartbeat::{HeartbeatHandle, HeartbeatReport, HeartbeatSettings, HeartbeatTask, StopReason};
pub use jitter::apply_jitter;
