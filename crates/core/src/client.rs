use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::Mutex;

use crate::alert::{
    AlertError, AlertNotification, AlertPhase, AlertRecord, AlertState, CreateRequest, Metadata,
    ModifyRequest,
};
use crate::transport::{AlertTransport, RequestFailure, TransportOutcome};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct Mirror {
    record: Option<AlertRecord>,
    state: Option<AlertState>,
}

/// Protocol client for a single alert.
///
/// Calls are serialized: the mirror lock is held for the whole round trip,
/// so at most one request per client is in flight. The mirror itself is a
/// cache and never decides whether a call is made.
pub struct AlertClient<T: AlertTransport> {
    transport: Arc<T>,
    timeout: Duration,
    uuid: OnceLock<String>,
    mirror: Mutex<Mirror>,
}

impl<T: AlertTransport> AlertClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_CALL_TIMEOUT,
            uuid: OnceLock::new(),
            mirror: Mutex::new(Mirror::default()),
        }
    }

    /// A client for an alert created elsewhere. Its local state starts out
    /// as an enabled, unpinged alert until responses say otherwise.
    pub fn attach(transport: Arc<T>, uuid: impl Into<String>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_CALL_TIMEOUT,
            uuid: OnceLock::from(uuid.into()),
            mirror: Mutex::new(Mirror {
                record: None,
                state: Some(AlertState::created(true)),
            }),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.get().map(String::as_str)
    }

    pub async fn state(&self) -> Option<AlertState> {
        self.mirror.lock().await.state
    }

    pub async fn phase(&self) -> AlertPhase {
        self.state()
            .await
            .map_or(AlertPhase::Uncreated, |s| s.phase())
    }

    /// Last known record. `None` for attached clients until identity is learned.
    pub async fn record(&self) -> Option<AlertRecord> {
        self.mirror.lock().await.record.clone()
    }

    pub async fn create(
        &self,
        artifact_hash: &str,
        artifact_meta_hash: &str,
        enabled: bool,
        metadata: Metadata,
    ) -> Result<String, AlertError> {
        let mut mirror = self.mirror.lock().await;
        if let Some(uuid) = self.uuid.get() {
            return Err(AlertError::AlreadyBound { uuid: uuid.clone() });
        }

        let request = CreateRequest {
            artifact_hash: artifact_hash.to_string(),
            artifact_meta_hash: artifact_meta_hash.to_string(),
            enabled,
            metadata,
        };
        let outcome = self
            .within(self.transport.create(&request, self.timeout))
            .await;

        // create has no 403/404/412 of its own; anything but success is a request error
        let echoed = match outcome {
            TransportOutcome::Ok(record) => record,
            TransportOutcome::Failed(f) => return Err(self.failed("create", "-", f)),
            other => {
                let f = RequestFailure::transport(format!(
                    "unexpected {} response to create",
                    other.label()
                ));
                return Err(self.failed("create", "-", f));
            }
        };

        let uuid = match echoed.uuid {
            Some(ref u) if !u.is_empty() => u.clone(),
            _ => {
                let f = RequestFailure::transport("create response carried no uuid");
                return Err(self.failed("create", "-", f));
            }
        };

        if self.uuid.set(uuid.clone()).is_err() {
            return Err(AlertError::AlreadyBound { uuid });
        }
        mirror.record = Some(AlertRecord {
            uuid: Some(uuid.clone()),
            artifact_hash: request.artifact_hash,
            artifact_meta_hash: request.artifact_meta_hash,
            enabled,
            metadata: request.metadata,
        });
        mirror.state = Some(AlertState::created(enabled));

        tracing::info!(uuid = %uuid, enabled, "alert created");
        Ok(uuid)
    }

    /// Changes `enabled`, and replaces metadata when `metadata` is `Some`.
    /// Identity fields are never touched.
    pub async fn modify(
        &self,
        uuid: &str,
        enabled: bool,
        metadata: Option<Metadata>,
    ) -> Result<(), AlertError> {
        let mut mirror = self.mirror.lock().await;
        let request = ModifyRequest { enabled, metadata };
        let outcome = self
            .within(self.transport.modify(uuid, &request, self.timeout))
            .await;

        let echoed = self.interpret("modify", uuid, outcome, &mut mirror)?;

        if self.is_own(uuid) {
            if let Some(state) = mirror.state.as_mut() {
                state.on_modified(enabled);
            }
            if let Some(record) = mirror.record.as_mut() {
                if echoed.is_some_and(|e| {
                    e.artifact_hash != record.artifact_hash
                        || e.artifact_meta_hash != record.artifact_meta_hash
                }) {
                    tracing::warn!(uuid = %uuid, "modify echoed a different artifact identity, ignoring");
                }
                record.enabled = enabled;
                if let Some(m) = request.metadata {
                    record.metadata = m;
                }
            } else if let Some(echoed) = echoed {
                // attached client: first look at the alert's identity
                mirror.record = Some(AlertRecord {
                    uuid: Some(uuid.to_string()),
                    enabled,
                    ..echoed
                });
            }
        }

        tracing::debug!(uuid = %uuid, enabled, "alert modified");
        Ok(())
    }

    /// Heartbeat. Resets the server-side countdown.
    pub async fn ping(&self, uuid: &str) -> Result<(), AlertError> {
        let mut mirror = self.mirror.lock().await;
        let notification = AlertNotification::new(uuid);
        let outcome = self
            .within(self.transport.ping(&notification, self.timeout))
            .await;

        self.interpret("ping", uuid, outcome, &mut mirror)?;
        if self.is_own(uuid) {
            if let Some(state) = mirror.state.as_mut() {
                state.on_ping_acknowledged();
            }
        }
        tracing::debug!(uuid = %uuid, "ping acknowledged");
        Ok(())
    }

    /// Fires the notification now, bypassing the countdown.
    pub async fn trigger(&self, uuid: &str) -> Result<(), AlertError> {
        let mut mirror = self.mirror.lock().await;
        let notification = AlertNotification::new(uuid);
        let outcome = self
            .within(self.transport.trigger(&notification, self.timeout))
            .await;

        self.interpret("trigger", uuid, outcome, &mut mirror)?;
        if self.is_own(uuid) {
            if let Some(state) = mirror.state.as_mut() {
                state.on_triggered();
            }
        }
        tracing::info!(uuid = %uuid, "alert triggered");
        Ok(())
    }

    fn is_own(&self, uuid: &str) -> bool {
        self.uuid.get().is_some_and(|own| own == uuid)
    }

    async fn within<R>(
        &self,
        fut: impl Future<Output = TransportOutcome<R>>,
    ) -> TransportOutcome<R> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(outcome) => outcome,
            Err(_) => TransportOutcome::Failed(RequestFailure::timed_out(self.timeout)),
        }
    }

    fn interpret<R>(
        &self,
        op: &'static str,
        uuid: &str,
        outcome: TransportOutcome<R>,
        mirror: &mut Mirror,
    ) -> Result<R, AlertError> {
        let own = self.is_own(uuid);
        match outcome {
            TransportOutcome::Ok(v) => Ok(v),
            TransportOutcome::Forbidden(msg) => {
                tracing::warn!(uuid = %uuid, op, "alert access denied");
                Err(AlertError::AccessDenied(msg))
            }
            TransportOutcome::NotFound => {
                if own {
                    if let Some(state) = mirror.state.as_mut() {
                        state.on_not_found();
                    }
                }
                tracing::warn!(uuid = %uuid, op, "alert not found");
                Err(AlertError::NotFound {
                    uuid: uuid.to_string(),
                })
            }
            TransportOutcome::Conflict(_) => {
                if own {
                    if let Some(state) = mirror.state.as_mut() {
                        state.on_conflict();
                    }
                }
                tracing::info!(uuid = %uuid, op, "alert already triggered");
                Err(AlertError::AlreadyTriggered {
                    uuid: uuid.to_string(),
                })
            }
            TransportOutcome::Failed(f) => Err(self.failed(op, uuid, f)),
        }
    }

    fn failed(&self, op: &'static str, uuid: &str, f: RequestFailure) -> AlertError {
        tracing::warn!(uuid = %uuid, op, status = ?f.status, error = %f.message, "alert request failed");
        AlertError::Request(f)
    }
}
