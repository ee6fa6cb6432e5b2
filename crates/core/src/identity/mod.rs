mod artifact;
mod credentials;
mod hasher;
mod ledger;

pub use artifact::{ArtifactIdentity, ArtifactRef, UnsupportedScheme};
pub use credentials::{require_token, ApiToken, CredentialError, TOKEN_ENV};
pub use hasher::{ArtifactHasher, FileHasher, HashError};
pub use ledger::{Keystore, KeystoreError, Ledger, LedgerError, SigningCredential, Verification};
