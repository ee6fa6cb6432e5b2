use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Unlocked key material used to sign a ledger commit.
#[derive(Clone)]
pub struct SigningCredential {
    pub owner: String,
    pub secret: Vec<u8>,
}

impl std::fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredential")
            .field("owner", &self.owner)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Result of looking an artifact hash up on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub verified: bool,
    pub owner: String,
    /// Unix seconds; 0 when the hash was never committed.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    Rejected(String),
    Unreachable(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(msg) => write!(f, "ledger rejected commit: {msg}"),
            Self::Unreachable(msg) => write!(f, "ledger unreachable: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Signing and verification pipeline. Implemented outside this crate.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Commits `artifact_hash` and returns the commitment (the alert's meta hash).
    async fn commit(
        &self,
        artifact_hash: &str,
        credential: &SigningCredential,
    ) -> Result<String, LedgerError>;

    async fn lookup(&self, artifact_hash: &str) -> Result<Verification, LedgerError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeystoreError {
    Missing,
    BadPassphrase,
}

impl std::fmt::Display for KeystoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "no keystore found"),
            Self::BadPassphrase => write!(f, "keystore passphrase rejected"),
        }
    }
}

impl std::error::Error for KeystoreError {}

pub trait Keystore: Send + Sync {
    fn unlock(&self, passphrase: &str) -> Result<SigningCredential, KeystoreError>;
}
