//! Viewer worker and front-end plumbing around `flipbook-core`

mod handlers;
pub mod logger;
pub mod worker;

#[cfg(feature = "pdf-viewer")]
pub mod decoder;

#[cfg(feature = "pdf-viewer")]
pub use decoder::{PdfiumDecoder, init_pdfium};
pub use logger::{AppLogger, LogEntry};
pub use worker::{spawn, worker_task};
