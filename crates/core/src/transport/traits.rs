use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::outcome::TransportOutcome;
use crate::alert::{AlertNotification, AlertRecord, CreateRequest, ModifyRequest};

/// The four remote alert operations.
///
/// Implementations never retry and never leak their own error types: every
/// failure is folded into [`TransportOutcome`]. Each call must give up once
/// `timeout` has elapsed.
#[async_trait]
pub trait AlertTransport: Send + Sync {
    async fn create(
        &self,
        request: &CreateRequest,
        timeout: Duration,
    ) -> TransportOutcome<AlertRecord>;

    /// `Ok(None)` when the authority acknowledged the change without echoing
    /// the alert back.
    async fn modify(
        &self,
        uuid: &str,
        request: &ModifyRequest,
        timeout: Duration,
    ) -> TransportOutcome<Option<AlertRecord>>;

    async fn ping(
        &self,
        notification: &AlertNotification,
        timeout: Duration,
    ) -> TransportOutcome<()>;

    async fn trigger(
        &self,
        notification: &AlertNotification,
        timeout: Duration,
    ) -> TransportOutcome<()>;
}

#[async_trait]
impl<T: AlertTransport + ?Sized> AlertTransport for Arc<T> {
    async fn create(
        &self,
        request: &CreateRequest,
        timeout: Duration,
    ) -> TransportOutcome<AlertRecord> {
        (**self).create(request, timeout).await
    }

    async fn modify(
        &self,
        uuid: &str,
        request: &ModifyRequest,
        timeout: Duration,
    ) -> TransportOutcome<Option<AlertRecord>> {
        (**self).modify(uuid, request, timeout).await
    }

    async fn ping(
        &self,
        notification: &AlertNotification,
        timeout: Duration,
    ) -> TransportOutcome<()> {
        (**self).ping(notification, timeout).await
    }

    async fn trigger(
        &self,
        notification: &AlertNotification,
        timeout: Duration,
    ) -> TransportOutcome<()> {
        (**self).trigger(notification, timeout).await
    }
}
