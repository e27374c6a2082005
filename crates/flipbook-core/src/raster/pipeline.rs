use super::PageDecoder;
use crate::types::{DecodeError, PageImage};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Events published by a rasterization run, in page order
#[derive(Debug, Clone)]
pub enum RasterEvent {
    PageCount(u32),
    Page(PageImage),
    PageFailed { index: u32, error: DecodeError },
    /// Every page has been attempted
    Finished,
    /// The document could not be opened at all
    OpenFailed(DecodeError),
}

impl RasterEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RasterEvent::Finished | RasterEvent::OpenFailed(_))
    }
}

pub struct PageRasterizer;

impl PageRasterizer {
    /// Start decoding `bytes` on a blocking worker.
    /// Restarting requires calling `spawn` again with the bytes.
    pub fn spawn(decoder: Arc<dyn PageDecoder>, bytes: Arc<[u8]>, scale: f32) -> RasterStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let handle = tokio::task::spawn_blocking(move || {
            rasterize_blocking(decoder.as_ref(), &bytes, scale, &flag, |event| {
                tx.send(event).is_ok()
            });
        });

        RasterStream {
            rx,
            cancelled,
            handle: Some(handle),
            finished: false,
        }
    }
}

/// Sequential decode loop. `emit` returns false when nobody is listening anymore.
/// A failed page is reported and skipped; the loop carries on with the next one.
pub fn rasterize_blocking(
    decoder: &dyn PageDecoder,
    bytes: &[u8],
    scale: f32,
    cancelled: &AtomicBool,
    mut emit: impl FnMut(RasterEvent) -> bool,
) {
    let mut listening = true;
    let result = decoder.open(bytes, &mut |source| {
        let count = source.page_count();
        log::info!("Rasterizing {} pages at {}x", count, scale);
        if !emit(RasterEvent::PageCount(count)) {
            listening = false;
            return;
        }

        for index in 1..=count {
            if cancelled.load(Ordering::Acquire) {
                log::debug!("Rasterization cancelled before page {}", index);
                return;
            }
            let event = match source.render(index, scale) {
                Ok(raster) => RasterEvent::Page(PageImage::new(index, raster)),
                Err(error) => {
                    log::warn!("{}", error);
                    RasterEvent::PageFailed { index, error }
                }
            };
            if !emit(event) {
                listening = false;
                return;
            }
        }
    });

    if !listening || cancelled.load(Ordering::Acquire) {
        return;
    }
    match result {
        Ok(()) => {
            emit(RasterEvent::Finished);
        }
        Err(error) => {
            log::warn!("{}", error);
            emit(RasterEvent::OpenFailed(error));
        }
    }
}

/// Finite, non-restartable sequence of raster events
pub struct RasterStream {
    rx: mpsc::UnboundedReceiver<RasterEvent>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    finished: bool,
}

impl RasterStream {
    /// Next event, or `None` once the run finished or was cancelled
    pub async fn next(&mut self) -> Option<RasterEvent> {
        if self.finished || self.is_cancelled() {
            return None;
        }
        let event = self.rx.recv().await;
        if self.is_cancelled() {
            return None;
        }
        match event {
            Some(event) => {
                if event.is_terminal() {
                    self.finished = true;
                }
                Some(event)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Stop decoding; the page being rendered finishes but is never published
    pub fn cancel(&mut self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        self.rx.close();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for RasterStream {
    fn drop(&mut self) {
        self.cancel();
    }
}
