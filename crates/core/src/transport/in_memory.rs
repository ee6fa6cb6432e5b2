use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::outcome::{RequestFailure, TransportOutcome};
use super::traits::AlertTransport;
use crate::alert::{AlertNotification, AlertRecord, CreateRequest, ModifyRequest};

/// What a disable does to an alert that has already fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisablePolicy {
    #[default]
    KeepFired,
    ClearFired,
}

#[derive(Debug, Clone)]
struct Entry {
    record: AlertRecord,
    owner: String,
    fired: bool,
    last_ping: Option<Instant>,
    pings: u64,
    notifications: u64,
}

struct Shared {
    alerts: DashMap<String, Entry>,
    countdown: Option<Duration>,
    disable_policy: DisablePolicy,
    latency: Option<Duration>,
    unavailable: AtomicBool,
}

/// Reference implementation of the remote authority, kept entirely in memory.
///
/// Clones share state. Each clone acts on behalf of one caller token, which
/// is how ownership (and therefore `Forbidden`) is modelled; see [`Self::as_caller`].
#[derive(Clone)]
pub struct InMemoryAuthority {
    shared: Arc<Shared>,
    caller: String,
}

impl InMemoryAuthority {
    pub fn new(caller: impl Into<String>) -> Self {
        Self::builder().build(caller)
    }

    pub fn builder() -> InMemoryAuthorityBuilder {
        InMemoryAuthorityBuilder::default()
    }

    /// Same alerts, different caller identity.
    pub fn as_caller(&self, caller: impl Into<String>) -> Self {
        Self {
            shared: self.shared.clone(),
            caller: caller.into(),
        }
    }

    /// Simulates the server-side countdown running out for `uuid`.
    pub fn expire_countdown(&self, uuid: &str) -> bool {
        match self.shared.alerts.get_mut(uuid) {
            Some(mut entry) if entry.record.enabled && !entry.fired => {
                fire(&mut entry);
                true
            }
            _ => false,
        }
    }

    pub fn set_unavailable(&self, down: bool) {
        self.shared.unavailable.store(down, Ordering::SeqCst);
    }

    pub fn record(&self, uuid: &str) -> Option<AlertRecord> {
        self.shared.alerts.get(uuid).map(|e| e.record.clone())
    }

    pub fn is_fired(&self, uuid: &str) -> bool {
        self.shared.alerts.get(uuid).is_some_and(|e| e.fired)
    }

    pub fn ping_count(&self, uuid: &str) -> u64 {
        self.shared.alerts.get(uuid).map_or(0, |e| e.pings)
    }

    /// How many notifications have gone out for `uuid`, across all cycles.
    pub fn notification_count(&self, uuid: &str) -> u64 {
        self.shared.alerts.get(uuid).map_or(0, |e| e.notifications)
    }

    async fn enter(&self) -> Result<(), RequestFailure> {
        if let Some(latency) = self.shared.latency {
            tokio::time::sleep(latency).await;
        }
        if self.shared.unavailable.load(Ordering::SeqCst) {
            return Err(RequestFailure::transport("connection refused"));
        }
        Ok(())
    }

    fn expire_if_due(&self, entry: &mut Entry) {
        let (Some(countdown), Some(last)) = (self.shared.countdown, entry.last_ping) else {
            return;
        };
        if entry.record.enabled && !entry.fired && last.elapsed() >= countdown {
            fire(entry);
        }
    }

    fn notify(&self, notification: &AlertNotification, ping: bool) -> TransportOutcome<()> {
        let uuid = notification.alert_uuid.as_str();
        let Some(mut entry) = self.shared.alerts.get_mut(uuid) else {
            return TransportOutcome::NotFound;
        };
        if entry.owner != self.caller {
            return TransportOutcome::Forbidden(format!("{} does not own this alert", self.caller));
        }
        self.expire_if_due(&mut entry);
        if entry.fired {
            return TransportOutcome::Conflict("notification already triggered".into());
        }

        if ping {
            entry.pings += 1;
            if entry.record.enabled {
                entry.last_ping = Some(Instant::now());
            }
        } else {
            fire(&mut entry);
        }
        TransportOutcome::Ok(())
    }
}

fn fire(entry: &mut Entry) {
    entry.fired = true;
    entry.last_ping = None;
    entry.notifications += 1;
}

#[async_trait]
impl AlertTransport for InMemoryAuthority {
    async fn create(
        &self,
        request: &CreateRequest,
        _timeout: Duration,
    ) -> TransportOutcome<AlertRecord> {
        if let Err(f) = self.enter().await {
            return TransportOutcome::Failed(f);
        }
        if request.artifact_hash.is_empty() || request.artifact_meta_hash.is_empty() {
            return TransportOutcome::Failed(RequestFailure::rejected(
                "artifactHash and artifactMetaHash are required",
                400,
            ));
        }

        let uuid = uuid::Uuid::new_v4().to_string();
        let record = AlertRecord {
            uuid: Some(uuid.clone()),
            artifact_hash: request.artifact_hash.clone(),
            artifact_meta_hash: request.artifact_meta_hash.clone(),
            enabled: request.enabled,
            metadata: request.metadata.clone(),
        };
        self.shared.alerts.insert(
            uuid,
            Entry {
                record: record.clone(),
                owner: self.caller.clone(),
                fired: false,
                last_ping: None,
                pings: 0,
                notifications: 0,
            },
        );
        TransportOutcome::Ok(record)
    }

    async fn modify(
        &self,
        uuid: &str,
        request: &ModifyRequest,
        _timeout: Duration,
    ) -> TransportOutcome<Option<AlertRecord>> {
        if let Err(f) = self.enter().await {
            return TransportOutcome::Failed(f);
        }
        let Some(mut entry) = self.shared.alerts.get_mut(uuid) else {
            return TransportOutcome::NotFound;
        };
        if entry.owner != self.caller {
            return TransportOutcome::Forbidden(format!("{} does not own this alert", self.caller));
        }
        self.expire_if_due(&mut entry);

        if !request.enabled {
            entry.last_ping = None;
            if self.shared.disable_policy == DisablePolicy::ClearFired {
                entry.fired = false;
            }
        }
        entry.record.enabled = request.enabled;
        if let Some(metadata) = &request.metadata {
            entry.record.metadata = metadata.clone();
        }
        TransportOutcome::Ok(Some(entry.record.clone()))
    }

    async fn ping(
        &self,
        notification: &AlertNotification,
        _timeout: Duration,
    ) -> TransportOutcome<()> {
        if let Err(f) = self.enter().await {
            return TransportOutcome::Failed(f);
        }
        self.notify(notification, true)
    }

    async fn trigger(
        &self,
        notification: &AlertNotification,
        _timeout: Duration,
    ) -> TransportOutcome<()> {
        if let Err(f) = self.enter().await {
            return TransportOutcome::Failed(f);
        }
        self.notify(notification, false)
    }
}

#[derive(Default)]
pub struct InMemoryAuthorityBuilder {
    countdown: Option<Duration>,
    disable_policy: DisablePolicy,
    latency: Option<Duration>,
}

impl InMemoryAuthorityBuilder {
    /// Fire automatically once this long has passed since the last ping.
    pub fn countdown(mut self, d: Duration) -> Self {
        self.countdown = Some(d);
        self
    }

    pub fn disable_policy(mut self, policy: DisablePolicy) -> Self {
        self.disable_policy = policy;
        self
    }

    /// Delay every response, for exercising client deadlines.
    pub fn latency(mut self, d: Duration) -> Self {
        self.latency = Some(d);
        self
    }

    pub fn build(self, caller: impl Into<String>) -> InMemoryAuthority {
        InMemoryAuthority {
            shared: Arc::new(Shared {
                alerts: DashMap::new(),
                countdown: self.countdown,
                disable_policy: self.disable_policy,
                latency: self.latency,
                unavailable: AtomicBool::new(false),
            }),
            caller: caller.into(),
        }
    }
}
