use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::jitter::apply_jitter;
use crate::alert::AlertError;
use crate::client::AlertClient;
use crate::config::HeartbeatConfig;
use crate::orchestrator::{heartbeat_via, HeartbeatStatus};
use crate::transport::AlertTransport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartbeatSettings {
    pub interval: Duration,
    pub jitter_fraction: f64,
    pub stop_on_triggered: bool,
}

impl From<&HeartbeatConfig> for HeartbeatSettings {
    fn from(c: &HeartbeatConfig) -> Self {
        Self {
            interval: c.interval(),
            jitter_fraction: c.jitter_fraction,
            stop_on_triggered: c.stop_on_triggered,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    Cancelled,
    Triggered,
    /// A permanent failure such as NotFound or AccessDenied.
    Failed(AlertError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatReport {
    pub pings: u64,
    pub reason: StopReason,
}

pub struct HeartbeatTask<T: AlertTransport + 'static> {
    pub client: Arc<AlertClient<T>>,
    pub uuid: String,
    pub settings: HeartbeatSettings,
}

/// Owner of a running heartbeat loop. Dropping it stops the loop too.
pub struct HeartbeatHandle {
    stop_tx: watch::Sender<bool>,
    pings: Arc<AtomicU64>,
    handle: JoinHandle<StopReason>,
}

impl HeartbeatHandle {
    /// Stops the loop without sending another ping. An in-flight ping is abandoned.
    pub async fn stop(self) -> HeartbeatReport {
        let _ = self.stop_tx.send(true);
        self.join().await
    }

    /// Waits for the loop to end by itself.
    pub async fn join(self) -> HeartbeatReport {
        let reason = self.handle.await.unwrap_or(StopReason::Cancelled);
        HeartbeatReport {
            pings: self.pings.load(Ordering::Relaxed),
            reason,
        }
    }

    pub fn pings(&self) -> u64 {
        self.pings.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T: AlertTransport + 'static> HeartbeatTask<T> {
    pub fn spawn(self) -> HeartbeatHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let pings = Arc::new(AtomicU64::new(0));
        let counter = pings.clone();
        let handle = tokio::spawn(self.run(stop_rx, counter));
        HeartbeatHandle {
            stop_tx,
            pings,
            handle,
        }
    }

    async fn run(self, mut stop_rx: watch::Receiver<bool>, pings: Arc<AtomicU64>) -> StopReason {
        let uuid = self.uuid.as_str();
        tracing::info!(
            uuid = %uuid,
            interval_s = self.settings.interval.as_secs_f64(),
            "heartbeat started"
        );

        let reason = loop {
            if *stop_rx.borrow() {
                break StopReason::Cancelled;
            }

            let result = tokio::select! {
                r = heartbeat_via(&*self.client, uuid) => r,
                _ = stop_rx.changed() => break StopReason::Cancelled,
            };

            match result {
                Ok(HeartbeatStatus::Alive) => {
                    pings.fetch_add(1, Ordering::Relaxed);
                }
                Ok(HeartbeatStatus::AlreadyTriggered) => {
                    if self.settings.stop_on_triggered {
                        break StopReason::Triggered;
                    }
                }
                Err(AlertError::Request(f)) => {
                    tracing::warn!(uuid = %uuid, error = %f, "heartbeat failed, next tick will try again");
                }
                Err(e) => break StopReason::Failed(e),
            }

            let wait = apply_jitter(self.settings.interval, self.settings.jitter_fraction);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = stop_rx.changed() => break StopReason::Cancelled,
            }
        };

        tracing::info!(uuid = %uuid, pings = pings.load(Ordering::Relaxed), reason = ?reason, "heartbeat stopped");
        reason
    }
}
