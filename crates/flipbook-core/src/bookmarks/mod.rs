//! Per-document bookmarks
//!
//! Bookmarks live in memory as an ordered set and are flushed to the
//! injected `KeyValueStore` on every mutation. A persistence failure
//! degrades the session to in-memory bookmarks with a single warning.

mod store;

pub use store::{DocumentRecord, JsonFileStore, KeyValueStore, MemoryStore};

use crate::types::{DocumentKey, PersistenceError};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyBookmarked,
}

pub struct BookmarkStore {
    key: DocumentKey,
    record: DocumentRecord,
    backend: Option<Arc<dyn KeyValueStore>>,
    degraded: bool,
    warning: Option<String>,
}

impl BookmarkStore {
    /// Read the persisted record for `key`. Never fails; a broken backend
    /// leaves the store in memory-only mode.
    pub fn open(key: DocumentKey, backend: Arc<dyn KeyValueStore>) -> Self {
        let mut store = Self::in_memory(key);
        match backend.load(&store.key) {
            Ok(record) => {
                store.record = record.unwrap_or_default();
                store.backend = Some(backend);
                log::debug!(
                    "Loaded {} bookmarks for {}",
                    store.record.bookmarks.len(),
                    store.key
                );
            }
            Err(e) => store.degrade(e),
        }
        store
    }

    pub fn in_memory(key: DocumentKey) -> Self {
        Self {
            key,
            record: DocumentRecord::default(),
            backend: None,
            degraded: false,
            warning: None,
        }
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    pub fn add(&mut self, page: u32) -> AddOutcome {
        if !self.record.bookmarks.insert(page) {
            return AddOutcome::AlreadyBookmarked;
        }
        self.flush();
        AddOutcome::Added
    }

    pub fn remove(&mut self, page: u32) -> bool {
        let removed = self.record.bookmarks.remove(&page);
        if removed {
            self.record.notes.remove(&page);
            self.flush();
        }
        removed
    }

    /// Returns whether `page` is bookmarked afterwards
    pub fn toggle(&mut self, page: u32) -> bool {
        if self.remove(page) {
            false
        } else {
            self.add(page);
            true
        }
    }

    pub fn contains(&self, page: u32) -> bool {
        self.record.bookmarks.contains(&page)
    }

    /// Ascending, deduplicated
    pub fn list(&self) -> Vec<u32> {
        self.record.bookmarks.iter().copied().collect()
    }

    /// Attach a note to an existing bookmark; `None` or blank clears it
    pub fn set_note(&mut self, page: u32, note: Option<String>) -> bool {
        if !self.contains(page) {
            return false;
        }
        match note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            Some(note) => {
                self.record.notes.insert(page, note);
            }
            None => {
                self.record.notes.remove(&page);
            }
        }
        self.flush();
        true
    }

    pub fn note(&self, page: u32) -> Option<&str> {
        self.record.notes.get(&page).map(String::as_str)
    }

    pub fn set_last_read(&mut self, page: u32) {
        if self.record.last_read_page != Some(page) {
            self.record.last_read_page = Some(page);
            self.flush();
        }
    }

    pub fn last_read(&self) -> Option<u32> {
        self.record.last_read_page
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The one-time warning raised when persistence failed, if not yet taken
    pub fn take_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    fn flush(&mut self) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Err(e) = backend.save(&self.key, &self.record) {
            self.degrade(e);
        }
    }

    fn degrade(&mut self, error: PersistenceError) {
        self.backend = None;
        if !self.degraded {
            self.degraded = true;
            let message = format!(
                "Bookmarks for {} will not be saved this session: {}",
                self.key, error
            );
            log::warn!("{}", message);
            self.warning = Some(message);
        }
    }
}
