use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;

use crate::alert::{AlertError, AlertState, Metadata};
use crate::client::{AlertClient, DEFAULT_CALL_TIMEOUT};
use crate::identity::{
    ArtifactHasher, ArtifactIdentity, ArtifactRef, HashError, Ledger, LedgerError,
    SigningCredential,
};
use crate::scheduler::{HeartbeatHandle, HeartbeatSettings, HeartbeatTask};
use crate::transport::AlertTransport;

/// Result of a heartbeat that reached the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatStatus {
    Alive,
    /// The alert already fired. Not an error; callers usually stop pinging.
    AlreadyTriggered,
}

/// Result of a manual trigger. Both variants mean a notification is out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FireOutcome {
    Fired,
    AlreadyFired,
}

#[derive(Debug)]
pub enum WatchdogError {
    Hash(HashError),
    Ledger(LedgerError),
    Alert(AlertError),
}

impl std::fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash(e) => write!(f, "hash: {e}"),
            Self::Ledger(e) => write!(f, "ledger: {e}"),
            Self::Alert(e) => write!(f, "alert: {e}"),
        }
    }
}

impl std::error::Error for WatchdogError {}

impl From<HashError> for WatchdogError {
    fn from(e: HashError) -> Self {
        Self::Hash(e)
    }
}

impl From<LedgerError> for WatchdogError {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}

impl From<AlertError> for WatchdogError {
    fn from(e: AlertError) -> Self {
        Self::Alert(e)
    }
}

pub(crate) async fn heartbeat_via<T: AlertTransport>(
    client: &AlertClient<T>,
    uuid: &str,
) -> Result<HeartbeatStatus, AlertError> {
    match client.ping(uuid).await {
        Ok(()) => Ok(HeartbeatStatus::Alive),
        Err(e) if e.is_already_triggered() => Ok(HeartbeatStatus::AlreadyTriggered),
        Err(e) => Err(e),
    }
}

/// User-facing watchdog verbs, one [`AlertClient`] per alert.
pub struct WatchdogOrchestrator<T: AlertTransport + 'static> {
    transport: Arc<T>,
    timeout: Duration,
    clients: DashMap<String, Arc<AlertClient<T>>>,
}

impl<T: AlertTransport + 'static> WatchdogOrchestrator<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_CALL_TIMEOUT,
            clients: DashMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The client bound to `uuid`, attaching one if this process never saw it.
    pub fn client(&self, uuid: &str) -> Arc<AlertClient<T>> {
        self.clients
            .entry(uuid.to_string())
            .or_insert_with(|| {
                Arc::new(AlertClient::attach(self.transport.clone(), uuid).with_timeout(self.timeout))
            })
            .value()
            .clone()
    }

    /// Drops the client for `uuid`. Returns whether one was held.
    pub fn forget(&self, uuid: &str) -> bool {
        self.clients.remove(uuid).is_some()
    }

    /// Number of alerts with a live client.
    pub fn tracked(&self) -> usize {
        self.clients.len()
    }

    // NotFound leaves only a stale copy behind; drop it
    fn settle<R>(&self, uuid: &str, result: Result<R, AlertError>) -> Result<R, AlertError> {
        if let Err(e) = &result {
            if e.is_not_found() && self.forget(uuid) {
                tracing::debug!(uuid = %uuid, "forgot client for missing alert");
            }
        }
        result
    }

    pub async fn state(&self, uuid: &str) -> Option<AlertState> {
        let client = self.clients.get(uuid).map(|c| c.value().clone())?;
        client.state().await
    }

    /// Creates an enabled alert for an already-signed artifact. The caller
    /// owns persisting the returned uuid.
    pub async fn create(
        &self,
        identity: &ArtifactIdentity,
        metadata: Metadata,
    ) -> Result<String, AlertError> {
        self.create_with(identity, true, metadata).await
    }

    pub async fn create_with(
        &self,
        identity: &ArtifactIdentity,
        enabled: bool,
        metadata: Metadata,
    ) -> Result<String, AlertError> {
        let client =
            AlertClient::new(self.transport.clone()).with_timeout(self.timeout);
        let uuid = client
            .create(&identity.hash, &identity.meta_hash, enabled, metadata)
            .await?;
        self.clients.insert(uuid.clone(), Arc::new(client));
        Ok(uuid)
    }

    /// Hash, commit, then create.
    pub async fn create_for_artifact<H, L>(
        &self,
        hasher: &H,
        ledger: &L,
        artifact: &ArtifactRef,
        credential: &SigningCredential,
        metadata: Metadata,
    ) -> Result<(ArtifactIdentity, String), WatchdogError>
    where
        H: ArtifactHasher + ?Sized,
        L: Ledger + ?Sized,
    {
        let hash = hasher.hash(artifact)?;
        let meta_hash = ledger.commit(&hash, credential).await?;
        let identity = ArtifactIdentity::new(hash, meta_hash);
        tracing::debug!(artifact = %artifact, hash = %identity.hash, "artifact committed");

        let uuid = self.create(&identity, metadata).await?;
        Ok((identity, uuid))
    }

    pub async fn arm(&self, uuid: &str) -> Result<(), AlertError> {
        self.modify(uuid, true, None).await
    }

    pub async fn disarm(&self, uuid: &str) -> Result<(), AlertError> {
        self.modify(uuid, false, None).await
    }

    pub async fn arm_with_metadata(
        &self,
        uuid: &str,
        metadata: Metadata,
    ) -> Result<(), AlertError> {
        self.modify(uuid, true, Some(metadata)).await
    }

    pub async fn disarm_with_metadata(
        &self,
        uuid: &str,
        metadata: Metadata,
    ) -> Result<(), AlertError> {
        self.modify(uuid, false, Some(metadata)).await
    }

    async fn modify(
        &self,
        uuid: &str,
        enabled: bool,
        metadata: Option<Metadata>,
    ) -> Result<(), AlertError> {
        let result = self.client(uuid).modify(uuid, enabled, metadata).await;
        self.settle(uuid, result)
    }

    pub async fn heartbeat(&self, uuid: &str) -> Result<HeartbeatStatus, AlertError> {
        let client = self.client(uuid);
        let result = heartbeat_via(&*client, uuid).await;
        self.settle(uuid, result)
    }

    pub async fn fire_now(&self, uuid: &str) -> Result<FireOutcome, AlertError> {
        let result = match self.client(uuid).trigger(uuid).await {
            Ok(()) => Ok(FireOutcome::Fired),
            Err(e) if e.is_already_triggered() => Ok(FireOutcome::AlreadyFired),
            Err(e) => Err(e),
        };
        self.settle(uuid, result)
    }

    /// Starts a periodic heartbeat for `uuid`.
    pub fn watch(&self, uuid: &str, settings: HeartbeatSettings) -> HeartbeatHandle {
        HeartbeatTask {
            client: self.client(uuid),
            uuid: uuid.to_string(),
            settings,
        }
        .spawn()
    }
}
