//! Key-value persistence for per-document reader state

use crate::types::{DocumentKey, PersistenceError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

/// Everything persisted for one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRecord {
    pub bookmarks: BTreeSet<u32>,
    pub notes: BTreeMap<u32, String>,
    pub last_read_page: Option<u32>,
}

/// Durable store scoped by document key
pub trait KeyValueStore: Send + Sync {
    fn load(&self, key: &DocumentKey) -> Result<Option<DocumentRecord>, PersistenceError>;
    fn save(&self, key: &DocumentKey, record: &DocumentRecord) -> Result<(), PersistenceError>;
}

/// One JSON file per document, named by a hash of its key
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, key: &DocumentKey) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_str().as_bytes());
        let hash = format!("{:x}", hasher.finalize());
        self.dir.join(format!("{hash}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &DocumentKey) -> Result<Option<DocumentRecord>, PersistenceError> {
        let path = self.record_path(key);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    fn save(&self, key: &DocumentKey, record: &DocumentRecord) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.record_path(key);
        let json = serde_json::to_vec_pretty(record)?;

        // Replace the record atomically
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Process-local store, used when no durable location is available and in tests
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<DocumentKey, DocumentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &DocumentKey) -> Result<Option<DocumentRecord>, PersistenceError> {
        let records = self
            .records
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory store poisoned".to_string()))?;
        Ok(records.get(key).cloned())
    }

    fn save(&self, key: &DocumentKey, record: &DocumentRecord) -> Result<(), PersistenceError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory store poisoned".to_string()))?;
        records.insert(key.clone(), record.clone());
        Ok(())
    }
}
