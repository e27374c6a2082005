//! Document rasterization
//!
//! A `PageDecoder` turns document bytes into bitmaps one page at a time.
//! `PageRasterizer` drives it sequentially on a blocking worker and publishes
//! each page as soon as it is ready; `PageStore` pins the results to their
//! indices for random access.

mod pipeline;
mod store;

pub use pipeline::{PageRasterizer, RasterEvent, RasterStream, rasterize_blocking};
pub use store::{PageSlot, PageStore};

use crate::types::DecodeError;

/// An opened document
pub trait PageSource {
    fn page_count(&self) -> u32;

    /// Render the 1-based page `index` at `scale` times its natural size
    fn render(&mut self, index: u32, scale: f32) -> Result<image::RgbaImage, DecodeError>;
}

/// Backend able to open document bytes
pub trait PageDecoder: Send + Sync + 'static {
    /// Open `bytes` and hand the document to `visit` for as long as it stays open
    fn open(
        &self,
        bytes: &[u8],
        visit: &mut dyn FnMut(&mut dyn PageSource),
    ) -> Result<(), DecodeError>;
}
