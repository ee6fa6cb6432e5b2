use crate::transport::RequestFailure;

#[derive(Debug, Clone, PartialEq)]
pub enum AlertError {
    /// 403: the caller has no rights over this alert.
    AccessDenied(String),
    /// 404: the uuid is unknown to the authority.
    NotFound { uuid: String },
    /// 412: a notification already fired in the current cycle.
    AlreadyTriggered { uuid: String },
    Request(RequestFailure),
    /// Create was called on a client that already watches an alert.
    AlreadyBound { uuid: String },
}

impl AlertError {
    pub fn is_already_triggered(&self) -> bool {
        matches!(self, Self::AlreadyTriggered { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "access_denied",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyTriggered { .. } => "already_triggered",
            Self::Request(_) => "request_error",
            Self::AlreadyBound { .. } => "already_bound",
        }
    }
}

impl std::fmt::Display for AlertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessDenied(msg) => write!(f, "illegal alert access: {msg}"),
            Self::NotFound { uuid } => write!(f, "no such alert found matching \"{uuid}\""),
            Self::AlreadyTriggered { uuid } => {
                write!(f, "notification already triggered for \"{uuid}\"")
            }
            Self::Request(failure) => write!(f, "{failure}"),
            Self::AlreadyBound { uuid } => {
                write!(f, "client is already bound to alert \"{uuid}\"")
            }
        }
    }
}

impl std::error::Error for AlertError {}

impl From<RequestFailure> for AlertError {
    fn from(f: RequestFailure) -> Self {
        Self::Request(f)
    }
}
