use flipbook_async_runtime::{
    DocumentId, ViewerCommand, ViewerHandle, ViewerUpdate, WorkerChannels, channel,
};
use flipbook_core::{
    AutoPlayScheduler, BookmarkStore, DocumentKey, FlipEngine, InputController, KeyValueStore,
    NavIntent, PageDecoder, PageStore, PageView, RasterEvent, RasterStream, ViewerOptions,
    ViewportController,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Interval;

use crate::handlers;

/// Viewer-wide state owned by the worker task
pub(crate) struct ViewerState {
    pub options: ViewerOptions,
    pub decoder: Arc<dyn PageDecoder>,
    pub backend: Arc<dyn KeyValueStore>,
    pub input: InputController,
    pub viewport: ViewportController,
    pub session: Option<Session>,
    next_doc_id: u64,
}

impl ViewerState {
    fn new(
        options: ViewerOptions,
        decoder: Arc<dyn PageDecoder>,
        backend: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            options,
            decoder,
            backend,
            input: InputController::default(),
            viewport: ViewportController::default(),
            session: None,
            next_doc_id: 0,
        }
    }

    pub fn next_id(&mut self) -> DocumentId {
        let id = DocumentId(self.next_doc_id);
        self.next_doc_id += 1;
        id
    }
}

/// One open document. Everything here is torn down together on close.
pub(crate) struct Session {
    pub doc_id: DocumentId,
    pub key: DocumentKey,
    pub bytes: Arc<[u8]>,
    pub engine: FlipEngine,
    pub autoplay: AutoPlayScheduler,
    pub bookmarks: BookmarkStore,
    pub pages: PageStore,
    pub raster: Option<RasterStream>,
    /// Present only while a flip is in flight
    pub frame_timer: Option<Interval>,
    /// Last-read page to jump to once the page count is known
    pub restore_page: Option<u32>,
}

impl Session {
    /// Current spread as page views; pending pages come back as placeholders
    pub fn spread(&self) -> (PageView, Option<PageView>) {
        let view = |index: u32| {
            self.pages
                .get(index)
                .unwrap_or(PageView::Placeholder { index })
        };
        let (left, right) = self.engine.visible_pages();
        (view(left), right.map(view))
    }

    pub fn is_visible(&self, index: u32) -> bool {
        let (left, right) = self.engine.visible_pages();
        index == left || right == Some(index)
    }

    async fn next_event(&mut self) -> SessionEvent {
        let Self {
            raster,
            frame_timer,
            autoplay,
            ..
        } = self;

        tokio::select! {
            event = next_raster(raster) => SessionEvent::Raster(event),
            _ = next_frame(frame_timer) => SessionEvent::Frame,
            _ = autoplay.tick() => SessionEvent::AutoPlay,
        }
    }
}

pub(crate) enum SessionEvent {
    Raster(Option<RasterEvent>),
    Frame,
    AutoPlay,
}

async fn next_raster(raster: &mut Option<RasterStream>) -> Option<RasterEvent> {
    match raster {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn next_frame(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn next_session_event(session: &mut Option<Session>) -> SessionEvent {
    match session {
        Some(session) => session.next_event().await,
        None => std::future::pending().await,
    }
}

/// Spawn the worker on the current runtime and return the front-end handle
pub fn spawn(
    decoder: Arc<dyn PageDecoder>,
    options: ViewerOptions,
    backend: Arc<dyn KeyValueStore>,
) -> ViewerHandle {
    let (handle, channels) = channel();
    tokio::spawn(worker_task(channels, decoder, options, backend));
    handle
}

/// Async worker task that owns all navigation state and publishes updates.
/// Runs until the command channel closes.
pub async fn worker_task(
    channels: WorkerChannels,
    decoder: Arc<dyn PageDecoder>,
    options: ViewerOptions,
    backend: Arc<dyn KeyValueStore>,
) {
    let WorkerChannels {
        mut command_rx,
        update_tx,
    } = channels;
    let mut state = ViewerState::new(options, decoder, backend);

    loop {
        tokio::select! {
            cmd = command_rx.recv() => match cmd {
                Some(cmd) => process_command(cmd, &mut state, &mut command_rx, &update_tx).await,
                None => break,
            },
            event = next_session_event(&mut state.session) => {
                process_session_event(event, &mut state, &update_tx);
            }
        }
    }

    if state.session.is_some() {
        log::debug!("Command channel closed, shutting down open document");
        handlers::document::handle_close(&mut state, &update_tx);
    }
}

fn process_session_event(
    event: SessionEvent,
    state: &mut ViewerState,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    let Some(session) = state.session.as_mut() else {
        return;
    };
    match event {
        SessionEvent::Raster(Some(event)) => {
            let input = &mut state.input;
            let result = handlers::document::handle_raster_event(event, session, input, update_tx);
            if let Err(error) = result {
                handlers::document::handle_open_failed(error, state, update_tx);
            }
        }
        SessionEvent::Raster(None) => {
            session.raster = None;
        }
        SessionEvent::Frame => handlers::navigation::handle_frame(session, update_tx),
        SessionEvent::AutoPlay => {
            handlers::navigation::handle_autoplay_tick(session, &state.options, update_tx);
        }
    }
}

async fn process_command(
    cmd: ViewerCommand,
    state: &mut ViewerState,
    command_rx: &mut mpsc::UnboundedReceiver<ViewerCommand>,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    match cmd {
        ViewerCommand::Open { source } => {
            handlers::document::handle_open(source, state, update_tx).await;
        }
        ViewerCommand::Close => {
            if state.session.is_some() {
                handlers::document::handle_close(state, update_tx);
            }
        }
        ViewerCommand::Advance => navigate(NavIntent::Advance, state, update_tx),
        ViewerCommand::Retreat => navigate(NavIntent::Retreat, state, update_tx),
        ViewerCommand::Goto { page } => navigate(NavIntent::Goto(page), state, update_tx),
        ViewerCommand::PointerDown { x, y } => state.input.pointer_down(x, y),
        ViewerCommand::PointerMove { x, y } => state.input.pointer_move(x, y),
        ViewerCommand::PointerUp { x, y } => {
            if let Some(intent) = state.input.pointer_up(x, y) {
                navigate(intent, state, update_tx);
            }
        }
        ViewerCommand::PointerCancel => state.input.pointer_cancel(),
        ViewerCommand::Key { key } => {
            if let Some(intent) = state.input.key(key) {
                navigate(intent, state, update_tx);
            }
        }
        ViewerCommand::SetViewerWidth { mut width } => {
            // Resizes arrive in bursts; only the latest width matters
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let ViewerCommand::SetViewerWidth { width: newer } = next_cmd {
                    width = newer;
                } else {
                    state.input.set_viewer_width(width);
                    Box::pin(process_command(next_cmd, state, command_rx, update_tx)).await;
                }
            }
            state.input.set_viewer_width(width);
        }
        ViewerCommand::SetAutoPlay { enabled } => match state.session.as_mut() {
            Some(session) => handlers::navigation::handle_set_autoplay(enabled, session, update_tx),
            None => log::debug!("Auto-play toggled with no document open"),
        },
        ViewerCommand::ToggleBookmark => {
            with_session(state, update_tx, handlers::bookmarks::handle_toggle);
        }
        ViewerCommand::AddBookmark { page } => with_session(state, update_tx, |s, tx| {
            handlers::bookmarks::handle_add(page, s, tx)
        }),
        ViewerCommand::RemoveBookmark { page } => with_session(state, update_tx, |s, tx| {
            handlers::bookmarks::handle_remove(page, s, tx)
        }),
        ViewerCommand::SetBookmarkNote { page, note } => with_session(state, update_tx, |s, tx| {
            handlers::bookmarks::handle_set_note(page, note, s, tx)
        }),
        ViewerCommand::ZoomIn => {
            state.viewport.zoom_in();
            handlers::viewport::publish(&state.viewport, update_tx);
        }
        ViewerCommand::ZoomOut => {
            state.viewport.zoom_out();
            handlers::viewport::publish(&state.viewport, update_tx);
        }
        ViewerCommand::FitWidth => {
            state.viewport.fit_width();
            handlers::viewport::publish(&state.viewport, update_tx);
        }
        ViewerCommand::FitPage => {
            state.viewport.fit_page();
            handlers::viewport::publish(&state.viewport, update_tx);
        }
        ViewerCommand::ExportOriginal { path } => match state.session.as_ref() {
            Some(session) => {
                handlers::export::handle_export_original(path, session.bytes.clone(), update_tx)
                    .await
            }
            None => no_document(update_tx),
        },
        ViewerCommand::ExportPrint { path, dpi } => match state.session.as_ref() {
            Some(session) => {
                let pages = session.pages.ready_pages().cloned().collect();
                handlers::export::handle_export_print(path, pages, dpi, update_tx).await;
            }
            None => no_document(update_tx),
        },
    }
}

fn navigate(
    intent: NavIntent,
    state: &mut ViewerState,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
) {
    match state.session.as_mut() {
        Some(session) => {
            handlers::navigation::apply_intent(intent, session, &state.options, update_tx)
        }
        None => log::debug!("Ignoring {:?}: no document open", intent),
    }
}

fn with_session(
    state: &mut ViewerState,
    update_tx: &mpsc::UnboundedSender<ViewerUpdate>,
    f: impl FnOnce(&mut Session, &mpsc::UnboundedSender<ViewerUpdate>),
) {
    match state.session.as_mut() {
        Some(session) => f(session, update_tx),
        None => no_document(update_tx),
    }
}

fn no_document(update_tx: &mpsc::UnboundedSender<ViewerUpdate>) {
    let _ = update_tx.send(ViewerUpdate::Error {
        message: "No document is open".to_string(),
    });
}
