use flipbook_async_runtime::ViewerUpdate;
use flipbook_core::{
    AutoPlayScheduler, BookmarkStore, DecodeError, DocumentMetadata, DocumentSource, FlipEngine,
    InputController, PageRasterizer, PageStore, RasterEvent,
};
use tokio::sync::mpsc;

use crate::worker::{Session, ViewerState};

pub async fn handle_open(
    source: DocumentSource,
    state: &mut ViewerState,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    if state.session.is_some() {
        handle_close(state, update_tx);
    }

    let name = source.display_name();
    let _ = update_tx.send(ViewerUpdate::Loading { name: name.clone() });

    let bytes = match source.fetch().await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to fetch {}: {}", name, e);
            let _ = update_tx.send(ViewerUpdate::FetchFailed {
                message: e.to_string(),
                retryable: e.is_retryable(),
            });
            return;
        }
    };

    // Metadata is informational only; a document pdfium can open may still trip lopdf
    let probe_bytes = bytes.clone();
    let metadata = match tokio::task::spawn_blocking(move || DocumentMetadata::probe(&probe_bytes))
        .await
    {
        Ok(Ok(metadata)) => Some(metadata),
        Ok(Err(e)) => {
            log::debug!("No metadata for {}: {}", name, e);
            None
        }
        Err(e) => {
            log::debug!("Metadata probe join error: {}", e);
            None
        }
    };

    let key = source.key();
    let doc_id = state.next_id();
    let bookmarks = BookmarkStore::open(key.clone(), state.backend.clone());
    let restore_page = bookmarks.last_read();
    let raster = PageRasterizer::spawn(
        state.decoder.clone(),
        bytes.clone(),
        state.options.render_scale,
    );

    log::info!("Opened {} ({} bytes)", name, bytes.len());
    let _ = update_tx.send(ViewerUpdate::Opened {
        doc_id,
        key: key.clone(),
        name,
        metadata,
    });

    let mut session = Session {
        doc_id,
        key,
        bytes,
        engine: FlipEngine::new(&state.options),
        autoplay: AutoPlayScheduler::new(state.options.autoplay_interval()),
        bookmarks,
        pages: PageStore::new(),
        raster: Some(raster),
        frame_timer: None,
        restore_page,
    };
    state.input.set_page_count(0);

    super::bookmarks::publish(&session, update_tx);
    report_persistence(&mut session, update_tx);
    state.session = Some(session);
}

/// Tear down the open document: stop decoding, clear the auto-play timer,
/// drop the frame loop and remember where the reader was
pub fn handle_close(state: &mut ViewerState, update_tx: &mpsc::UnboundedSender<ViewerUpdate>) {
    let Some(mut session) = state.session.take() else {
        return;
    };

    if let Some(mut raster) = session.raster.take() {
        raster.cancel();
    }
    if session.autoplay.is_enabled() {
        session.autoplay.cancel();
        let _ = update_tx.send(ViewerUpdate::AutoPlayChanged { enabled: false });
    }
    session.frame_timer = None;

    if session.engine.total_pages() > 0 {
        session.bookmarks.set_last_read(session.engine.current_page());
    }
    session.engine.shutdown();
    state.input.pointer_cancel();

    log::info!("Closed {}", session.key);
    let _ = update_tx.send(ViewerUpdate::Closed {
        doc_id: session.doc_id,
    });
}

/// Apply one raster event to the session. An error means the document could
/// not be opened at all and the session must be torn down.
pub fn handle_raster_event(
    event: RasterEvent,
    session: &mut Session,
    input: &mut InputController,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) -> Result<(), DecodeError> {
    let doc_id = session.doc_id;
    match event {
        RasterEvent::PageCount(total_pages) => {
            session.pages.set_page_count(total_pages);
            session.engine.set_page_count(total_pages);
            input.set_page_count(total_pages);
            let _ = update_tx.send(ViewerUpdate::PageCount {
                doc_id,
                total_pages,
            });

            if let Some(page) = session.restore_page.take() {
                log::debug!("Restoring last-read page {}", page);
                session.engine.goto(page);
            }
            publish_spread(session, update_tx);
        }
        RasterEvent::Page(page) => {
            let index = page.index;
            session.pages.insert(page.clone());
            let _ = update_tx.send(ViewerUpdate::PageReady {
                doc_id,
                page,
                total: session.pages.page_count(),
            });
            if session.is_visible(index) {
                publish_spread(session, update_tx);
            }
        }
        RasterEvent::PageFailed { index, error } => {
            let message = error.to_string();
            session.pages.mark_failed(index, message.clone());
            let _ = update_tx.send(ViewerUpdate::PageFailed {
                doc_id,
                index,
                message,
            });
            if session.is_visible(index) {
                publish_spread(session, update_tx);
            }
        }
        RasterEvent::Finished => {
            session.raster = None;
            let ready = session.pages.ready_count();
            let failed = session.pages.failed_count();
            log::info!("Rasterized {} pages ({} failed)", ready, failed);
            let _ = update_tx.send(ViewerUpdate::RasterFinished {
                doc_id,
                ready,
                failed,
            });
        }
        RasterEvent::OpenFailed(error) => {
            session.raster = None;
            return Err(error);
        }
    }
    Ok(())
}

/// Close a document the decoder rejected and offer the front end a retry
pub fn handle_open_failed(
    error: DecodeError,
    state: &mut ViewerState,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    let Some(doc_id) = state.session.as_ref().map(|session| session.doc_id) else {
        return;
    };
    log::warn!("Closing undecodable document: {}", error);
    handle_close(state, update_tx);
    let _ = update_tx.send(ViewerUpdate::OpenFailed {
        doc_id,
        message: error.to_string(),
    });
}

/// Publish the current spread. Pending pages go out as placeholders and are
/// swapped in by a later call once they arrive.
pub fn publish_spread(session: &Session, update_tx: &mpsc::UnboundedSender<ViewerUpdate>) {
    let (left, right) = session.spread();
    let _ = update_tx.send(ViewerUpdate::SpreadChanged {
        doc_id: session.doc_id,
        left,
        right,
    });
}

/// Forward the bookmark store's one-time degradation warning, if any
pub fn report_persistence(session: &mut Session, update_tx: &mpsc::UnboundedSender<ViewerUpdate>) {
    if let Some(message) = session.bookmarks.take_warning() {
        let _ = update_tx.send(ViewerUpdate::PersistenceDegraded { message });
    }
}
