//! Document byte retrieval

use crate::types::{DocumentKey, FetchError};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a document's bytes come from. The bytes are assumed already authorized.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    File(PathBuf),
    /// Bytes handed over by an external delivery collaborator
    Memory { name: String, bytes: Arc<[u8]> },
}

impl DocumentSource {
    pub fn memory(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        DocumentSource::Memory {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Key used to scope persisted reader state
    pub fn key(&self) -> DocumentKey {
        match self {
            DocumentSource::File(path) => {
                let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
                DocumentKey::new(path.to_string_lossy())
            }
            DocumentSource::Memory { name, .. } => DocumentKey::new(name.clone()),
        }
    }

    /// Human-readable name for status lines
    pub fn display_name(&self) -> String {
        match self {
            DocumentSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            DocumentSource::Memory { name, .. } => name.clone(),
        }
    }

    pub async fn fetch(&self) -> Result<Arc<[u8]>, FetchError> {
        let bytes: Arc<[u8]> = match self {
            DocumentSource::File(path) => tokio::fs::read(path).await?.into(),
            DocumentSource::Memory { bytes, .. } => bytes.clone(),
        };
        if bytes.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(bytes)
    }
}
