use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Failure retrieving the document bytes. Fatal to the viewing session.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Document source is empty")]
    Empty,
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl FetchError {
    /// Whether offering a retry makes sense for this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Io(_) | FetchError::TaskJoin(_))
    }
}

/// Decoding failure. `Page` is scoped to a single page and never aborts the document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Failed to open document: {0}")]
    Open(String),
    #[error("Failed to decode page {index}: {message}")]
    Page { index: u32, message: String },
}

/// Why a navigation request was dropped. Never surfaced to the reader.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationNoOp {
    #[error("a flip is already in progress")]
    Animating,
    #[error("target spread is out of range")]
    OutOfRange,
    #[error("viewer has been shut down")]
    ShutDown,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ViewerError>;

/// Stable key used to scope persisted state (bookmarks, last-read page) to a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey(pub String);

impl DocumentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Page turn direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    #[default]
    None,
}

/// A rasterized page, pinned to its 1-based index
#[derive(Debug, Clone)]
pub struct PageImage {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub raster: Arc<image::RgbaImage>,
}

impl PageImage {
    pub fn new(index: u32, raster: image::RgbaImage) -> Self {
        Self {
            index,
            width: raster.width(),
            height: raster.height(),
            raster: Arc::new(raster),
        }
    }

    pub fn rgba_bytes(&self) -> &[u8] {
        self.raster.as_raw()
    }
}

/// What the viewer should show for a page slot
#[derive(Debug, Clone)]
pub enum PageView {
    Ready(PageImage),
    /// Not rasterized yet; swapped for the real image once it arrives
    Placeholder { index: u32 },
    /// Decoding failed; shown as a fallback tile
    Unavailable { index: u32, reason: String },
}

impl PageView {
    pub fn index(&self) -> u32 {
        match self {
            PageView::Ready(image) => image.index,
            PageView::Placeholder { index } | PageView::Unavailable { index, .. } => *index,
        }
    }
}
