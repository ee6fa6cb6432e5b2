use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use watchdog_core::alert::{AlertError, AlertPhase, Metadata};
use watchdog_core::client::AlertClient;
use watchdog_core::orchestrator::{FireOutcome, HeartbeatStatus, WatchdogOrchestrator};
use watchdog_core::scheduler::{HeartbeatSettings, StopReason};
use watchdog_core::transport::{DisablePolicy, InMemoryAuthority};

fn meta(pairs: &[(&str, serde_json::Value)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

async fn created(auth: &InMemoryAuthority) -> (AlertClient<InMemoryAuthority>, String) {
    let client = AlertClient::new(Arc::new(auth.clone()));
    let uuid = client
        .create("abc123", "def456", true, Metadata::new())
        .await
        .unwrap();
    (client, uuid)
}

#[tokio::test]
async fn create_ping_trigger_scenario() {
    let auth = InMemoryAuthority::new("alice");
    let (client, u1) = created(&auth).await;
    assert!(!u1.is_empty());

    client.ping(&u1).await.unwrap();
    client.trigger(&u1).await.unwrap();

    let err = client.trigger(&u1).await.unwrap_err();
    assert_eq!(err, AlertError::AlreadyTriggered { uuid: u1.clone() });

    let err = client.ping(&u1).await.unwrap_err();
    assert!(err.is_already_triggered());
    assert_eq!(client.phase().await, AlertPhase::Triggered);
    assert_eq!(auth.notification_count(&u1), 1);
}

#[tokio::test]
async fn fire_now_succeeds_both_times() {
    let auth = InMemoryAuthority::new("alice");
    let o = WatchdogOrchestrator::new(Arc::new(auth.clone()));
    let (_, uuid) = created(&auth).await;

    assert_eq!(o.fire_now(&uuid).await.unwrap(), FireOutcome::Fired);
    assert_eq!(o.fire_now(&uuid).await.unwrap(), FireOutcome::AlreadyFired);
    assert_eq!(auth.notification_count(&uuid), 1);
}

#[tokio::test]
async fn concurrent_fire_now_sends_one_notification() {
    let auth = InMemoryAuthority::new("alice");
    let o = Arc::new(WatchdogOrchestrator::new(Arc::new(auth.clone())));
    let (_, uuid) = created(&auth).await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let o = o.clone();
        let uuid = uuid.clone();
        tasks.push(tokio::spawn(async move { o.fire_now(&uuid).await }));
    }

    let mut fired = 0;
    for t in tasks {
        if t.await.unwrap().unwrap() == FireOutcome::Fired {
            fired += 1;
        }
    }
    assert_eq!(fired, 1);
    assert_eq!(auth.notification_count(&uuid), 1);
}

#[tokio::test]
async fn modify_never_changes_identity() {
    let auth = InMemoryAuthority::new("alice");
    let (client, uuid) = created(&auth).await;

    client
        .modify(&uuid, false, Some(meta(&[("artifactHash", json!("evil"))])))
        .await
        .unwrap();
    client.modify(&uuid, true, None).await.unwrap();

    let record = auth.record(&uuid).unwrap();
    assert_eq!(record.uuid.as_deref(), Some(uuid.as_str()));
    assert_eq!(record.artifact_hash, "abc123");
    assert_eq!(record.artifact_meta_hash, "def456");
    assert_eq!(record.metadata["artifactHash"], "evil");

    let mirrored = client.record().await.unwrap();
    assert_eq!(mirrored.artifact_hash, "abc123");
    assert_eq!(mirrored.artifact_meta_hash, "def456");
}

#[tokio::test]
async fn modify_without_metadata_keeps_it() {
    let auth = InMemoryAuthority::new("alice");
    let client = AlertClient::new(Arc::new(auth.clone()));
    let uuid = client
        .create("abc123", "def456", true, meta(&[("team", json!("ops"))]))
        .await
        .unwrap();

    client.modify(&uuid, false, None).await.unwrap();
    let record = auth.record(&uuid).unwrap();
    assert!(!record.enabled);
    assert_eq!(record.metadata, meta(&[("team", json!("ops"))]));
}

#[tokio::test]
async fn modify_with_empty_metadata_clears_it() {
    let auth = InMemoryAuthority::new("alice");
    let o = WatchdogOrchestrator::new(Arc::new(auth.clone()));
    let client = AlertClient::new(Arc::new(auth.clone()));
    let uuid = client
        .create("abc123", "def456", true, meta(&[("team", json!("ops"))]))
        .await
        .unwrap();

    o.disarm_with_metadata(&uuid, Metadata::new()).await.unwrap();
    assert!(auth.record(&uuid).unwrap().metadata.is_empty());
}

#[tokio::test]
async fn modify_unknown_uuid_is_not_found() {
    let auth = InMemoryAuthority::new("alice");
    let (client, _) = created(&auth).await;
    let err = client
        .modify("nonexistent-uuid", false, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AlertError::NotFound {
            uuid: "nonexistent-uuid".into()
        }
    );
    // the client's own alert is not marked stale by a miss on another uuid
    assert!(!client.state().await.unwrap().stale);
}

#[tokio::test]
async fn ping_by_non_owner_is_denied() {
    let auth = InMemoryAuthority::new("alice");
    let (_, uuid) = created(&auth).await;

    let mallory = AlertClient::attach(Arc::new(auth.as_caller("mallory")), uuid.clone());
    let err = mallory.ping(&uuid).await.unwrap_err();
    assert!(matches!(err, AlertError::AccessDenied(_)));
    assert_eq!(auth.ping_count(&uuid), 0);
}

#[tokio::test]
async fn conflict_supersedes_stale_watching() {
    let auth = InMemoryAuthority::new("alice");
    let (client, uuid) = created(&auth).await;

    client.ping(&uuid).await.unwrap();
    assert_eq!(client.phase().await, AlertPhase::Watching);

    auth.expire_countdown(&uuid);
    let err = client.ping(&uuid).await.unwrap_err();
    assert!(err.is_already_triggered());
    assert_eq!(client.phase().await, AlertPhase::Triggered);
}

#[tokio::test]
async fn countdown_expires_without_pings() {
    let auth = InMemoryAuthority::builder()
        .countdown(Duration::from_millis(30))
        .build("alice");
    let (client, uuid) = created(&auth).await;

    client.ping(&uuid).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;

    let err = client.ping(&uuid).await.unwrap_err();
    assert!(err.is_already_triggered());
    assert!(auth.is_fired(&uuid));
}

#[tokio::test]
async fn heartbeat_loop_keeps_countdown_alive() {
    let auth = InMemoryAuthority::builder()
        .countdown(Duration::from_millis(150))
        .build("alice");
    let o = WatchdogOrchestrator::new(Arc::new(auth.clone()));
    let (_, uuid) = created(&auth).await;

    let handle = o.watch(
        &uuid,
        HeartbeatSettings {
            interval: Duration::from_millis(10),
            jitter_fraction: 0.1,
            stop_on_triggered: true,
        },
    );
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!auth.is_fired(&uuid));

    let report = handle.stop().await;
    assert_eq!(report.reason, StopReason::Cancelled);
    assert!(report.pings > 0);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(
        o.heartbeat(&uuid).await.unwrap(),
        HeartbeatStatus::AlreadyTriggered
    );
}

#[tokio::test]
async fn disabled_alert_does_not_expire() {
    let auth = InMemoryAuthority::builder()
        .countdown(Duration::from_millis(20))
        .build("alice");
    let (client, uuid) = created(&auth).await;

    client.ping(&uuid).await.unwrap();
    client.modify(&uuid, false, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    client.ping(&uuid).await.unwrap();
    assert!(!auth.is_fired(&uuid));
    assert_eq!(client.phase().await, AlertPhase::Disabled);
}

#[tokio::test]
async fn disable_keeps_fired_under_keep_policy() {
    let auth = InMemoryAuthority::builder()
        .disable_policy(DisablePolicy::KeepFired)
        .build("alice");
    let (client, uuid) = created(&auth).await;

    client.trigger(&uuid).await.unwrap();
    client.modify(&uuid, false, None).await.unwrap();
    assert!(client.state().await.unwrap().fired);
    assert_eq!(client.phase().await, AlertPhase::Disabled);

    client.modify(&uuid, true, None).await.unwrap();
    assert_eq!(client.phase().await, AlertPhase::Triggered);

    let err = client.ping(&uuid).await.unwrap_err();
    assert!(err.is_already_triggered());
}

#[tokio::test]
async fn disable_clears_fired_under_clear_policy() {
    let auth = InMemoryAuthority::builder()
        .disable_policy(DisablePolicy::ClearFired)
        .build("alice");
    let (client, uuid) = created(&auth).await;

    client.trigger(&uuid).await.unwrap();
    client.modify(&uuid, false, None).await.unwrap();
    client.modify(&uuid, true, None).await.unwrap();
    // the mirror cannot tell which policy the authority applies
    assert_eq!(client.phase().await, AlertPhase::Triggered);

    client.ping(&uuid).await.unwrap();
    assert_eq!(client.phase().await, AlertPhase::Watching);

    client.trigger(&uuid).await.unwrap();
    assert_eq!(auth.notification_count(&uuid), 2);
}

#[tokio::test]
async fn deadline_becomes_request_error() {
    let auth = InMemoryAuthority::builder()
        .latency(Duration::from_millis(200))
        .build("alice");
    let client = AlertClient::attach(Arc::new(auth), "u1").with_timeout(Duration::from_millis(20));

    match client.ping("u1").await {
        Err(AlertError::Request(f)) => {
            assert_eq!(f.status, None);
            assert!(f.message.contains("deadline"));
        }
        other => panic!("expected request error, got {other:?}"),
    }
}

#[tokio::test]
async fn unavailable_authority_is_request_error() {
    let auth = InMemoryAuthority::new("alice");
    let (client, uuid) = created(&auth).await;
    auth.set_unavailable(true);

    let err = client.trigger(&uuid).await.unwrap_err();
    assert!(matches!(err, AlertError::Request(ref f) if f.is_transport_level()));
    assert_eq!(client.phase().await, AlertPhase::Armed);
}

mod artifact_flow {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use watchdog_core::identity::{
        ArtifactRef, FileHasher, Keystore, KeystoreError, Ledger, LedgerError, SigningCredential,
        Verification,
    };

    use super::*;

    struct PassphraseKeystore;

    impl Keystore for PassphraseKeystore {
        fn unlock(&self, passphrase: &str) -> Result<SigningCredential, KeystoreError> {
            if passphrase != "open sesame" {
                return Err(KeystoreError::BadPassphrase);
            }
            Ok(SigningCredential {
                owner: "0xfeed".into(),
                secret: b"k".to_vec(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingLedger {
        commits: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Ledger for RecordingLedger {
        async fn commit(
            &self,
            artifact_hash: &str,
            credential: &SigningCredential,
        ) -> Result<String, LedgerError> {
            self.commits
                .lock()
                .unwrap()
                .push((artifact_hash.to_string(), credential.owner.clone()));
            Ok(format!("commit-{}", &artifact_hash[..8]))
        }

        async fn lookup(&self, artifact_hash: &str) -> Result<Verification, LedgerError> {
            let commits = self.commits.lock().unwrap();
            Ok(match commits.iter().find(|(h, _)| h == artifact_hash) {
                Some((_, owner)) => Verification {
                    verified: true,
                    owner: owner.clone(),
                    timestamp: 1_700_000_000,
                },
                None => Verification {
                    verified: false,
                    owner: String::new(),
                    timestamp: 0,
                },
            })
        }
    }

    #[tokio::test]
    async fn file_is_hashed_committed_and_watched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.bin");
        std::fs::write(&path, b"abc").unwrap();

        let auth = InMemoryAuthority::new("alice");
        let o = WatchdogOrchestrator::new(Arc::new(auth.clone()));
        let ledger = RecordingLedger::default();
        let credential = PassphraseKeystore.unlock("open sesame").unwrap();

        let (identity, uuid) = o
            .create_for_artifact(
                &FileHasher,
                &ledger,
                &ArtifactRef::File(path),
                &credential,
                Metadata::new(),
            )
            .await
            .unwrap();

        assert!(identity.hash.starts_with("ba7816bf"));
        assert_eq!(identity.meta_hash, "commit-ba7816bf");
        assert_eq!(auth.record(&uuid).unwrap().artifact_meta_hash, identity.meta_hash);

        let v = ledger.lookup(&identity.hash).await.unwrap();
        assert!(v.verified);
        assert_eq!(v.owner, "0xfeed");
    }

    #[tokio::test]
    async fn images_are_not_hashed_locally() {
        let auth = InMemoryAuthority::new("alice");
        let o = WatchdogOrchestrator::new(Arc::new(auth));
        let ledger = RecordingLedger::default();
        let credential = PassphraseKeystore.unlock("open sesame").unwrap();

        let err = o
            .create_for_artifact(
                &FileHasher,
                &ledger,
                &"docker:alpine".parse::<ArtifactRef>().unwrap(),
                &credential,
                Metadata::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, watchdog_core::WatchdogError::Hash(_)));
        assert!(ledger.commits.lock().unwrap().is_empty());
    }

    #[test]
    fn wrong_passphrase_is_rejected() {
        assert_eq!(
            PassphraseKeystore.unlock("guess").unwrap_err(),
            KeystoreError::BadPassphrase
        );
    }
}

mod in_flight {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use watchdog_core::alert::{AlertNotification, AlertRecord, CreateRequest, ModifyRequest};
    use watchdog_core::transport::{AlertTransport, TransportOutcome};

    use super::*;

    const HOLD: Duration = Duration::from_millis(20);

    /// Records how many calls overlap, holding each one open for a while.
    struct Overlap {
        inner: InMemoryAuthority,
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Overlap {
        fn new(inner: InMemoryAuthority) -> Self {
            Self {
                inner,
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        async fn hold<R>(&self, outcome: TransportOutcome<R>) -> TransportOutcome<R> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(HOLD).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            outcome
        }

        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        fn reset(&self) {
            self.peak.store(0, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl AlertTransport for Overlap {
        async fn create(
            &self,
            request: &CreateRequest,
            timeout: Duration,
        ) -> TransportOutcome<AlertRecord> {
            let outcome = self.inner.create(request, timeout).await;
            self.hold(outcome).await
        }

        async fn modify(
            &self,
            uuid: &str,
            request: &ModifyRequest,
            timeout: Duration,
        ) -> TransportOutcome<Option<AlertRecord>> {
            let outcome = self.inner.modify(uuid, request, timeout).await;
            self.hold(outcome).await
        }

        async fn ping(
            &self,
            notification: &AlertNotification,
            timeout: Duration,
        ) -> TransportOutcome<()> {
            let outcome = self.inner.ping(notification, timeout).await;
            self.hold(outcome).await
        }

        async fn trigger(
            &self,
            notification: &AlertNotification,
            timeout: Duration,
        ) -> TransportOutcome<()> {
            let outcome = self.inner.trigger(notification, timeout).await;
            self.hold(outcome).await
        }
    }

    fn identity() -> watchdog_core::identity::ArtifactIdentity {
        watchdog_core::identity::ArtifactIdentity::new("abc123", "def456")
    }

    #[tokio::test]
    async fn calls_on_one_alert_never_overlap() {
        let transport = Arc::new(Overlap::new(InMemoryAuthority::new("alice")));
        let o = Arc::new(WatchdogOrchestrator::new(transport.clone()));
        let uuid = o.create(&identity(), Metadata::new()).await.unwrap();
        transport.reset();

        let mut tasks = Vec::new();
        for i in 0..4 {
            let (oh, uuidh) = (o.clone(), uuid.clone());
            tasks.push(tokio::spawn(async move {
                let _ = oh.heartbeat(&uuidh).await;
            }));
            let (o, uuid) = (o.clone(), uuid.clone());
            tasks.push(tokio::spawn(async move {
                let _ = if i % 2 == 0 { o.arm(&uuid).await } else { o.disarm(&uuid).await };
            }));
        }
        let (o2, uuid2) = (o.clone(), uuid.clone());
        tasks.push(tokio::spawn(async move {
            let _ = o2.fire_now(&uuid2).await;
        }));
        for t in tasks {
            t.await.unwrap();
        }

        assert_eq!(transport.peak(), 1);
    }

    #[tokio::test]
    async fn calls_on_different_alerts_may_overlap() {
        let transport = Arc::new(Overlap::new(InMemoryAuthority::new("alice")));
        let o = Arc::new(WatchdogOrchestrator::new(transport.clone()));
        let a = o.create(&identity(), Metadata::new()).await.unwrap();
        let b = o.create(&identity(), Metadata::new()).await.unwrap();
        transport.reset();

        let (oa, ob) = (o.clone(), o.clone());
        let (ra, rb) = tokio::join!(
            async move { oa.heartbeat(&a).await },
            async move { ob.heartbeat(&b).await },
        );
        assert_eq!(ra.unwrap(), HeartbeatStatus::Alive);
        assert_eq!(rb.unwrap(), HeartbeatStatus::Alive);
        assert_eq!(transport.peak(), 2);
    }
}
