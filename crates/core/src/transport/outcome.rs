use std::time::Duration;

/// Result of one remote alert operation, as seen at the transport boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome<T> {
    Ok(T),
    Forbidden(String),
    NotFound,
    /// Only produced by ping and trigger: the alert already fired this cycle.
    Conflict(String),
    Failed(RequestFailure),
}

impl<T> TransportOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TransportOutcome<U> {
        match self {
            Self::Ok(v) => TransportOutcome::Ok(f(v)),
            Self::Forbidden(m) => TransportOutcome::Forbidden(m),
            Self::NotFound => TransportOutcome::NotFound,
            Self::Conflict(m) => TransportOutcome::Conflict(m),
            Self::Failed(e) => TransportOutcome::Failed(e),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok(_) => "ok",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Failed(_) => "failed",
        }
    }
}

/// A non-success that is neither 403, 404 nor 412.
///
/// `status` is `None` when the request never produced a usable response
/// (timeout, refused connection, undecodable body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub message: String,
    pub status: Option<u16>,
}

impl RequestFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn rejected(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn timed_out(after: Duration) -> Self {
        Self::transport(format!("deadline of {}ms exceeded", after.as_millis()))
    }

    pub fn is_transport_level(&self) -> bool {
        self.status.is_none()
    }
}

impl std::fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(code) => write!(f, "request failed: {} ({code})", self.message),
            None => write!(f, "request failed: {}", self.message),
        }
    }
}

impl std::error::Error for RequestFailure {}
