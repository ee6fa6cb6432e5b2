use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form annotation attached to an alert. Always replaced as a whole.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A watchdog alert as known to the remote authority.
///
/// `uuid`, `artifact_hash` and `artifact_meta_hash` are fixed at creation.
/// Only `enabled` and `metadata` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub artifact_hash: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub artifact_meta_hash: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub metadata: Metadata,
}

impl AlertRecord {
    pub fn new(
        artifact_hash: impl Into<String>,
        artifact_meta_hash: impl Into<String>,
        enabled: bool,
        metadata: Metadata,
    ) -> Self {
        Self {
            uuid: None,
            artifact_hash: artifact_hash.into(),
            artifact_meta_hash: artifact_meta_hash.into(),
            enabled,
            metadata,
        }
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }
}

/// Body of `POST /alert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub artifact_hash: String,
    pub artifact_meta_hash: String,
    pub enabled: bool,
    pub metadata: Metadata,
}

/// Body of `PATCH /alert?uuid=`. A `None` metadata leaves the stored value alone;
/// `Some` of an empty map clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifyRequest {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Body of `POST /alert/ping` and `POST /alert/notify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertNotification {
    #[serde(rename = "alertUUID")]
    pub alert_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl AlertNotification {
    pub fn new(alert_uuid: impl Into<String>) -> Self {
        Self {
            alert_uuid: alert_uuid.into(),
            metadata: None,
        }
    }
}
