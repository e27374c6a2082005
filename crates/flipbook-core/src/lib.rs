pub mod autoplay;
pub mod bookmarks;
pub mod constants;
mod export;
mod fetch;
pub mod flip;
pub mod input;
mod metadata;
mod options;
pub mod raster;
pub mod spread;
mod types;
pub mod viewport;

pub use autoplay::AutoPlayScheduler;
pub use bookmarks::{
    AddOutcome, BookmarkStore, DocumentRecord, JsonFileStore, KeyValueStore, MemoryStore,
};
pub use export::{build_print_pdf, export_original, export_print_pdf};
pub use fetch::DocumentSource;
pub use flip::{FlipEngine, FlipOutcome, FlipState, FrameOutcome, SliceTransform};
pub use input::{InputController, Key, NavIntent};
pub use metadata::DocumentMetadata;
pub use options::*;
pub use raster::{
    PageDecoder, PageRasterizer, PageSource, PageStore, RasterEvent, RasterStream,
    rasterize_blocking,
};
pub use types::*;
pub use viewport::{FitMode, ViewportController};
