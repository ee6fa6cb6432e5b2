use std::fs::File;
use std::io::{BufReader, Read};

use sha2::{Digest, Sha256};

use super::artifact::ArtifactRef;

pub trait ArtifactHasher: Send + Sync {
    fn hash(&self, artifact: &ArtifactRef) -> Result<String, HashError>;
}

#[derive(Debug)]
pub enum HashError {
    Io(std::io::Error),
    Unsupported(String),
}

impl std::fmt::Display for HashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Unsupported(what) => write!(f, "cannot hash {what}"),
        }
    }
}

impl std::error::Error for HashError {}

impl From<std::io::Error> for HashError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// SHA-256 over local file contents, lowercase hex.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileHasher;

const CHUNK: usize = 64 * 1024;

impl ArtifactHasher for FileHasher {
    fn hash(&self, artifact: &ArtifactRef) -> Result<String, HashError> {
        let path = match artifact {
            ArtifactRef::File(p) => p,
            ArtifactRef::Image(_) => {
                return Err(HashError::Unsupported(format!("image {artifact}")));
            }
        };

        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hex::encode(hasher.finalize()))
    }
}
