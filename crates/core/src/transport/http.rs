use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;

use super::outcome::{RequestFailure, TransportOutcome};
use super::traits::AlertTransport;
use crate::alert::{AlertNotification, AlertRecord, CreateRequest, ModifyRequest};

/// [`AlertTransport`] over the platform's REST API.
pub struct HttpTransport {
    base_url: String,
    token: String,
    http: Client,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<u16>,
}

struct RawResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl RawResponse {
    fn failure(&self) -> RequestFailure {
        let parsed: ErrorBody = serde_json::from_slice(&self.body).unwrap_or_default();
        let message = if parsed.message.is_empty() {
            self.status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        } else {
            parsed.message
        };
        RequestFailure::rejected(message, parsed.status.unwrap_or(self.status.as_u16()))
    }

    fn message(&self) -> String {
        self.failure().message
    }

    fn record(&self) -> TransportOutcome<AlertRecord> {
        match serde_json::from_slice(&self.body) {
            Ok(record) => TransportOutcome::Ok(record),
            Err(e) => TransportOutcome::Failed(RequestFailure::transport(format!(
                "malformed alert in response: {e}"
            ))),
        }
    }

    /// The alert a 200 from PATCH may carry. The status alone means success,
    /// and a body without a uuid is not treated as an echo.
    fn echo(&self) -> Option<AlertRecord> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        match serde_json::from_slice::<Option<AlertRecord>>(&self.body) {
            Ok(record) => record.filter(|r| r.uuid.is_some()),
            Err(e) => {
                tracing::debug!(error = %e, "modify response carried no alert");
                None
            }
        }
    }
}

impl HttpTransport {
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    pub fn with_client(base_url: &str, token: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        timeout: Duration,
    ) -> Result<RawResponse, RequestFailure> {
        let result = builder
            .bearer_auth(&self.token)
            .timeout(timeout)
            .send()
            .await;

        let resp = result.map_err(|e| {
            if e.is_timeout() {
                RequestFailure::timed_out(timeout)
            } else {
                RequestFailure::transport(e.to_string())
            }
        })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            if e.is_timeout() {
                RequestFailure::timed_out(timeout)
            } else {
                RequestFailure::transport(e.to_string())
            }
        })?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }

    async fn notify(
        &self,
        what: &str,
        notification: &AlertNotification,
        timeout: Duration,
    ) -> TransportOutcome<()> {
        let builder = self.http.post(self.url(&format!("alert/{what}"))).json(notification);
        let resp = match self.send(builder, timeout).await {
            Ok(r) => r,
            Err(f) => return TransportOutcome::Failed(f),
        };

        match resp.status {
            StatusCode::OK => TransportOutcome::Ok(()),
            StatusCode::FORBIDDEN => TransportOutcome::Forbidden(resp.message()),
            StatusCode::NOT_FOUND => TransportOutcome::NotFound,
            StatusCode::PRECONDITION_FAILED => TransportOutcome::Conflict(resp.message()),
            _ => TransportOutcome::Failed(resp.failure()),
        }
    }
}

#[async_trait]
impl AlertTransport for HttpTransport {
    async fn create(
        &self,
        request: &CreateRequest,
        timeout: Duration,
    ) -> TransportOutcome<AlertRecord> {
        let builder = self.http.post(self.url("alert")).json(request);
        let resp = match self.send(builder, timeout).await {
            Ok(r) => r,
            Err(f) => return TransportOutcome::Failed(f),
        };

        if resp.status == StatusCode::OK {
            resp.record()
        } else {
            TransportOutcome::Failed(resp.failure())
        }
    }

    async fn modify(
        &self,
        uuid: &str,
        request: &ModifyRequest,
        timeout: Duration,
    ) -> TransportOutcome<Option<AlertRecord>> {
        let builder = self
            .http
            .patch(self.url("alert"))
            .query(&[("uuid", uuid)])
            .json(request);
        let resp = match self.send(builder, timeout).await {
            Ok(r) => r,
            Err(f) => return TransportOutcome::Failed(f),
        };

        match resp.status {
            StatusCode::OK => TransportOutcome::Ok(resp.echo()),
            StatusCode::FORBIDDEN => TransportOutcome::Forbidden(resp.message()),
            StatusCode::NOT_FOUND => TransportOutcome::NotFound,
            _ => TransportOutcome::Failed(resp.failure()),
        }
    }

    async fn ping(
        &self,
        notification: &AlertNotification,
        timeout: Duration,
    ) -> TransportOutcome<()> {
        self.notify("ping", notification, timeout).await
    }

    async fn trigger(
        &self,
        notification: &AlertNotification,
        timeout: Duration,
    ) -> TransportOutcome<()> {
        self.notify("notify", notification, timeout).await
    }
}
