use serde::{Deserialize, Serialize};

/// Best-effort local mirror of an alert's server-side state.
///
/// `enabled` and `fired` are independent axes. Nothing here is authoritative:
/// the server's countdown can fire the alert at any moment, and the only
/// evidence the client ever gets is a `Conflict` on the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertState {
    pub enabled: bool,
    pub fired: bool,
    pub pinged: bool,
    pub stale: bool,
}

/// Derived label over [`AlertState`], for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPhase {
    Uncreated,
    Disabled,
    Armed,
    Watching,
    Triggered,
}

impl AlertState {
    pub fn created(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> AlertPhase {
        match (self.enabled, self.fired, self.pinged) {
            (false, _, _) => AlertPhase::Disabled,
            (true, true, _) => AlertPhase::Triggered,
            (true, false, true) => AlertPhase::Watching,
            (true, false, false) => AlertPhase::Armed,
        }
    }

    pub fn on_modified(&mut self, enabled: bool) {
        // fired survives a disable; whether the server clears it is unknown
        self.enabled = enabled;
        self.stale = false;
    }

    pub fn on_ping_acknowledged(&mut self) {
        self.pinged = true;
        self.fired = false;
        self.stale = false;
    }

    pub fn on_triggered(&mut self) {
        self.fired = true;
        self.stale = false;
    }

    pub fn on_conflict(&mut self) {
        self.fired = true;
    }

    pub fn on_not_found(&mut self) {
        self.stale = true;
    }
}

impl AlertPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uncreated => "uncreated",
            Self::Disabled => "disabled",
            Self::Armed => "armed",
            Self::Watching => "watching",
            Self::Triggered => "triggered",
        }
    }
}

impl std::fmt::Display for AlertPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
