use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Something that can be hashed into an artifact identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRef {
    File(PathBuf),
    /// `docker:<image>`
    Image(String),
}

/// Hash plus the commitment produced when the hash was signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactIdentity {
    pub hash: String,
    pub meta_hash: String,
}

impl ArtifactIdentity {
    pub fn new(hash: impl Into<String>, meta_hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            meta_hash: meta_hash.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedScheme(pub String);

impl std::fmt::Display for UnsupportedScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: not supported", self.0)
    }
}

impl std::error::Error for UnsupportedScheme {}

impl FromStr for ArtifactRef {
    type Err = UnsupportedScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(image) = s.strip_prefix("docker:") {
            return Ok(Self::Image(image.to_string()));
        }
        if s.starts_with("git:") {
            return Err(UnsupportedScheme("git".into()));
        }
        Ok(Self::File(PathBuf::from(s)))
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(p) => write!(f, "{}", p.display()),
            Self::Image(i) => write!(f, "docker:{i}"),
        }
    }
}
