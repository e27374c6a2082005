use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

// Re-export types from library crates
pub use flipbook_core::{
    Direction, DocumentKey, DocumentMetadata, DocumentSource, FitMode, Key, PageImage, PageView,
    SliceTransform, ViewerOptions,
};

/// Commands sent from a front end to the viewer worker
#[derive(Debug)]
pub enum ViewerCommand {
    Open {
        source: DocumentSource,
    },
    Advance,
    Retreat,
    Goto {
        page: u32,
    },
    PointerDown {
        x: f32,
        y: f32,
    },
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerUp {
        x: f32,
        y: f32,
    },
    /// Pointer left the surface or the host cancelled the gesture
    PointerCancel,
    Key {
        key: Key,
    },
    /// Width of the viewer surface, used to find the midline for pointer releases
    SetViewerWidth {
        width: f32,
    },
    SetAutoPlay {
        enabled: bool,
    },
    /// Toggle the bookmark on the current spread's left page
    ToggleBookmark,
    AddBookmark {
        page: u32,
    },
    RemoveBookmark {
        page: u32,
    },
    SetBookmarkNote {
        page: u32,
        note: Option<String>,
    },
    ZoomIn,
    ZoomOut,
    FitWidth,
    FitPage,
    ExportOriginal {
        path: PathBuf,
    },
    ExportPrint {
        path: PathBuf,
        dpi: f32,
    },
    Close,
}

/// Updates sent from the viewer worker to the front end
#[derive(Debug, Clone)]
pub enum ViewerUpdate {
    Loading {
        name: String,
    },
    Opened {
        doc_id: DocumentId,
        key: DocumentKey,
        name: String,
        metadata: Option<DocumentMetadata>,
    },
    PageCount {
        doc_id: DocumentId,
        total_pages: u32,
    },
    PageReady {
        doc_id: DocumentId,
        page: PageImage,
        total: u32,
    },
    PageFailed {
        doc_id: DocumentId,
        index: u32,
        message: String,
    },
    RasterFinished {
        doc_id: DocumentId,
        ready: usize,
        failed: usize,
    },
    /// The visible spread, or one of its pages, changed
    SpreadChanged {
        doc_id: DocumentId,
        left: PageView,
        right: Option<PageView>,
    },
    FlipStarted {
        doc_id: DocumentId,
        direction: Direction,
        target: u32,
    },
    FlipFrame {
        doc_id: DocumentId,
        direction: Direction,
        progress: f32,
        slices: Vec<SliceTransform>,
    },
    FlipCommitted {
        doc_id: DocumentId,
        page: u32,
    },
    AutoPlayChanged {
        enabled: bool,
    },
    BookmarksChanged {
        pages: Vec<u32>,
    },
    /// Add was requested for a page that is already bookmarked
    BookmarkExists {
        page: u32,
    },
    PersistenceDegraded {
        message: String,
    },
    ViewportChanged {
        zoom: f32,
        fit_mode: FitMode,
    },
    Exported {
        path: PathBuf,
    },
    /// The document bytes could not be fetched; the viewer did not open
    FetchFailed {
        message: String,
        retryable: bool,
    },
    /// The bytes arrived but could not be decoded; the document has been closed
    OpenFailed {
        doc_id: DocumentId,
        message: String,
    },
    Error {
        message: String,
    },
    Closed {
        doc_id: DocumentId,
    },
}

/// Handle to an opened document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

#[derive(Error, Debug)]
#[error("viewer worker has stopped")]
pub struct WorkerGone;

/// Front-end side of the worker channels
pub struct ViewerHandle {
    command_tx: mpsc::UnboundedSender<ViewerCommand>,
    update_rx: mpsc::UnboundedReceiver<ViewerUpdate>,
}

/// Worker side of the channels
pub struct WorkerChannels {
    pub command_rx: mpsc::UnboundedReceiver<ViewerCommand>,
    pub update_tx: mpsc::UnboundedSender<ViewerUpdate>,
}

/// Create a connected handle/worker channel pair
pub fn channel() -> (ViewerHandle, WorkerChannels) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    (
        ViewerHandle {
            command_tx,
            update_rx,
        },
        WorkerChannels {
            command_rx,
            update_tx,
        },
    )
}

impl ViewerHandle {
    pub fn send(&self, command: ViewerCommand) -> Result<(), WorkerGone> {
        self.command_tx.send(command).map_err(|_| WorkerGone)
    }

    /// Non-blocking poll, for frame-driven front ends
    pub fn try_recv(&mut self) -> Option<ViewerUpdate> {
        self.update_rx.try_recv().ok()
    }

    pub async fn recv(&mut self) -> Option<ViewerUpdate> {
        self.update_rx.recv().await
    }
}
