use crate::config::WatchdogConfig;

pub const TOKEN_ENV: &str = "WATCHDOG_API_TOKEN";

/// Bearer token for the alert API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    Missing,
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(
                f,
                "no API token: set {TOKEN_ENV} or api.token in the config file"
            ),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Precondition check run before any authenticated call.
pub fn require_token(config: &WatchdogConfig) -> Result<ApiToken, CredentialError> {
    let from_env = std::env::var(TOKEN_ENV).ok();
    resolve_token(from_env.as_deref(), config.api.token.as_deref())
}

fn resolve_token(env: Option<&str>, file: Option<&str>) -> Result<ApiToken, CredentialError> {
    [env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(ApiToken::new)
        .ok_or(CredentialError::Missing)
}
