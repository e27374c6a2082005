use flipbook_async_runtime::{
    Direction, DocumentSource, Key, PageView, ViewerCommand, ViewerHandle, ViewerUpdate,
};
use flipbook_core::{
    DecodeError, DocumentKey, DocumentRecord, FitMode, KeyValueStore, MemoryStore, PageDecoder,
    PageSource, PersistenceError, ViewerOptions,
};
use std::sync::{Arc, Mutex, mpsc as std_mpsc};
use std::time::Duration;
use tempfile::TempDir;

const FAKE_BYTES: &[u8] = b"%PDF-1.7 fake document";

/// Decoder producing blank pages. With a gate, every page after the first
/// waits for a token before it is rendered.
struct FakeDecoder {
    pages: u32,
    gate: Option<Mutex<std_mpsc::Receiver<()>>>,
}

impl FakeDecoder {
    fn new(pages: u32) -> Self {
        Self { pages, gate: None }
    }

    fn gated(pages: u32) -> (Self, std_mpsc::Sender<()>) {
        let (tx, rx) = std_mpsc::channel();
        (
            Self {
                pages,
                gate: Some(Mutex::new(rx)),
            },
            tx,
        )
    }
}

struct FakeSource<'a> {
    decoder: &'a FakeDecoder,
}

impl PageSource for FakeSource<'_> {
    fn page_count(&self) -> u32 {
        self.decoder.pages
    }

    fn render(&mut self, index: u32, _scale: f32) -> Result<image::RgbaImage, DecodeError> {
        if let Some(gate) = &self.decoder.gate {
            if index > 1 {
                let _ = gate.lock().unwrap().recv();
            }
        }
        Ok(image::RgbaImage::from_pixel(
            40,
            60,
            image::Rgba([250, 250, 245, 255]),
        ))
    }
}

impl PageDecoder for FakeDecoder {
    fn open(
        &self,
        _bytes: &[u8],
        visit: &mut dyn FnMut(&mut dyn PageSource),
    ) -> Result<(), DecodeError> {
        visit(&mut FakeSource { decoder: self });
        Ok(())
    }
}

/// Decoder that rejects every document
struct CorruptDecoder;

impl PageDecoder for CorruptDecoder {
    fn open(
        &self,
        _bytes: &[u8],
        _visit: &mut dyn FnMut(&mut dyn PageSource),
    ) -> Result<(), DecodeError> {
        Err(DecodeError::Open("corrupt".to_string()))
    }
}

/// Backend whose writes always fail
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn load(&self, _key: &DocumentKey) -> Result<Option<DocumentRecord>, PersistenceError> {
        Ok(None)
    }

    fn save(&self, _key: &DocumentKey, _record: &DocumentRecord) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("read-only".to_string()))
    }
}

fn start(decoder: FakeDecoder) -> ViewerHandle {
    start_with(decoder, Arc::new(MemoryStore::new()))
}

fn start_with(decoder: impl PageDecoder, backend: Arc<dyn KeyValueStore>) -> ViewerHandle {
    flipbook_viewer::spawn(Arc::new(decoder), ViewerOptions::default(), backend)
}

fn document(name: &str) -> DocumentSource {
    DocumentSource::memory(name, FAKE_BYTES.to_vec())
}

/// Collect updates up to and including the first one matching `done`
async fn recv_until(
    handle: &mut ViewerHandle,
    done: impl Fn(&ViewerUpdate) -> bool,
) -> Vec<ViewerUpdate> {
    let mut updates = Vec::new();
    while let Some(update) = handle.recv().await {
        let finished = done(&update);
        updates.push(update);
        if finished {
            return updates;
        }
    }
    panic!("worker stopped; received {:?}", updates);
}

async fn open_and_render(handle: &mut ViewerHandle, name: &str) -> Vec<ViewerUpdate> {
    handle
        .send(ViewerCommand::Open {
            source: document(name),
        })
        .unwrap();
    recv_until(handle, |u| matches!(u, ViewerUpdate::RasterFinished { .. })).await
}

fn committed_pages(updates: &[ViewerUpdate]) -> Vec<u32> {
    updates
        .iter()
        .filter_map(|u| match u {
            ViewerUpdate::FlipCommitted { page, .. } => Some(*page),
            _ => None,
        })
        .collect()
}

fn last_spread(updates: &[ViewerUpdate]) -> Option<(PageView, Option<PageView>)> {
    updates.iter().rev().find_map(|u| match u {
        ViewerUpdate::SpreadChanged { left, right, .. } => Some((left.clone(), right.clone())),
        _ => None,
    })
}

#[tokio::test(start_paused = true)]
async fn test_three_advances_land_on_page_seven() {
    let mut handle = start(FakeDecoder::new(10));
    open_and_render(&mut handle, "ten-pages").await;

    for expected in [3, 5, 7] {
        handle.send(ViewerCommand::Advance).unwrap();
        let updates =
            recv_until(&mut handle, |u| matches!(u, ViewerUpdate::FlipCommitted { .. })).await;
        assert_eq!(committed_pages(&updates), vec![expected]);

        let frames: Vec<f32> = updates
            .iter()
            .filter_map(|u| match u {
                ViewerUpdate::FlipFrame { progress, .. } => Some(*progress),
                _ => None,
            })
            .collect();
        assert!(!frames.is_empty());
        assert!(frames.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[tokio::test(start_paused = true)]
async fn test_request_during_flip_is_dropped() {
    let mut handle = start(FakeDecoder::new(10));
    open_and_render(&mut handle, "ten-pages").await;

    handle.send(ViewerCommand::Advance).unwrap();
    handle.send(ViewerCommand::Advance).unwrap();
    let updates =
        recv_until(&mut handle, |u| matches!(u, ViewerUpdate::FlipCommitted { .. })).await;

    let started = updates
        .iter()
        .filter(|u| matches!(u, ViewerUpdate::FlipStarted { .. }))
        .count();
    assert_eq!(started, 1);
    assert_eq!(committed_pages(&updates), vec![3]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let mut rest = Vec::new();
    while let Some(update) = handle.try_recv() {
        rest.push(update);
    }
    assert!(committed_pages(&rest).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_stops_at_final_spread() {
    let mut handle = start(FakeDecoder::new(5));
    open_and_render(&mut handle, "five-pages").await;

    handle
        .send(ViewerCommand::SetAutoPlay { enabled: true })
        .unwrap();
    let updates = recv_until(&mut handle, |u| {
        matches!(u, ViewerUpdate::AutoPlayChanged { enabled: false })
    })
    .await;

    assert!(matches!(
        updates.first(),
        Some(ViewerUpdate::AutoPlayChanged { enabled: true })
    ));
    assert_eq!(committed_pages(&updates), vec![3, 5]);

    // No further turns once disabled
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(handle.try_recv().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_close_mid_flip_stops_everything() {
    let mut handle = start(FakeDecoder::new(10));
    open_and_render(&mut handle, "ten-pages").await;

    handle
        .send(ViewerCommand::SetAutoPlay { enabled: true })
        .unwrap();
    handle.send(ViewerCommand::Advance).unwrap();
    recv_until(&mut handle, |u| matches!(u, ViewerUpdate::FlipFrame { .. })).await;

    handle.send(ViewerCommand::Close).unwrap();
    let updates = recv_until(&mut handle, |u| matches!(u, ViewerUpdate::Closed { .. })).await;
    assert!(committed_pages(&updates).is_empty());
    assert!(
        updates
            .iter()
            .any(|u| matches!(u, ViewerUpdate::AutoPlayChanged { enabled: false }))
    );

    // Neither the frame loop nor the auto-play timer survives the close
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(handle.try_recv().is_none());

    // Navigation without a document is ignored
    handle.send(ViewerCommand::Advance).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(handle.try_recv().is_none());
}

#[tokio::test]
async fn test_goto_pending_page_swaps_placeholder() {
    let (decoder, gate) = FakeDecoder::gated(10);
    let mut handle = start(decoder);

    handle
        .send(ViewerCommand::Open {
            source: document("slow"),
        })
        .unwrap();
    recv_until(&mut handle, |u| {
        matches!(u, ViewerUpdate::PageReady { page, .. } if page.index == 1)
    })
    .await;

    handle.send(ViewerCommand::Goto { page: 8 }).unwrap();
    let updates = recv_until(&mut handle, |u| {
        matches!(u, ViewerUpdate::SpreadChanged { left, .. } if left.index() == 7)
    })
    .await;
    match last_spread(&updates) {
        Some((PageView::Placeholder { index: 7 }, Some(PageView::Placeholder { index: 8 }))) => {}
        other => panic!("expected placeholders for 7-8, got {:?}", other),
    }

    for _ in 2..=10 {
        gate.send(()).unwrap();
    }
    let updates =
        recv_until(&mut handle, |u| matches!(u, ViewerUpdate::RasterFinished { .. })).await;

    assert!(updates.iter().any(|u| matches!(
        u,
        ViewerUpdate::SpreadChanged { left: PageView::Ready(page), .. } if page.index == 7
    )));
    match last_spread(&updates) {
        Some((PageView::Ready(left), Some(PageView::Ready(right)))) => {
            assert_eq!((left.index, right.index), (7, 8));
        }
        other => panic!("expected rendered 7-8, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_pointer_release_side_picks_direction() {
    let mut handle = start(FakeDecoder::new(10));
    open_and_render(&mut handle, "ten-pages").await;

    handle
        .send(ViewerCommand::SetViewerWidth { width: 800.0 })
        .unwrap();
    handle
        .send(ViewerCommand::PointerDown { x: 300.0, y: 40.0 })
        .unwrap();
    handle
        .send(ViewerCommand::PointerMove { x: 500.0, y: 40.0 })
        .unwrap();
    handle
        .send(ViewerCommand::PointerUp { x: 620.0, y: 40.0 })
        .unwrap();

    let updates =
        recv_until(&mut handle, |u| matches!(u, ViewerUpdate::FlipCommitted { .. })).await;
    assert!(updates.iter().any(|u| matches!(
        u,
        ViewerUpdate::FlipStarted {
            direction: Direction::Forward,
            target: 3,
            ..
        }
    )));

    handle
        .send(ViewerCommand::PointerDown { x: 100.0, y: 40.0 })
        .unwrap();
    handle
        .send(ViewerCommand::PointerUp { x: 100.0, y: 40.0 })
        .unwrap();
    let updates =
        recv_until(&mut handle, |u| matches!(u, ViewerUpdate::FlipCommitted { .. })).await;
    assert_eq!(committed_pages(&updates), vec![1]);
}

#[tokio::test]
async fn test_cancelled_press_does_not_turn_on_release() {
    let mut handle = start(FakeDecoder::new(10));
    open_and_render(&mut handle, "ten-pages").await;

    handle
        .send(ViewerCommand::SetViewerWidth { width: 800.0 })
        .unwrap();
    handle
        .send(ViewerCommand::PointerDown { x: 600.0, y: 40.0 })
        .unwrap();
    handle.send(ViewerCommand::PointerCancel).unwrap();
    handle
        .send(ViewerCommand::PointerUp { x: 600.0, y: 40.0 })
        .unwrap();
    handle.send(ViewerCommand::ZoomIn).unwrap();

    // The zoom reply is the only update: the stray release started nothing
    let updates =
        recv_until(&mut handle, |u| matches!(u, ViewerUpdate::ViewportChanged { .. })).await;
    assert_eq!(updates.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_undecodable_document_is_closed() {
    let mut handle = start_with(CorruptDecoder, Arc::new(MemoryStore::new()));
    handle
        .send(ViewerCommand::Open {
            source: document("corrupt"),
        })
        .unwrap();
    handle
        .send(ViewerCommand::SetAutoPlay { enabled: true })
        .unwrap();

    let updates = recv_until(&mut handle, |u| matches!(u, ViewerUpdate::OpenFailed { .. })).await;
    let closed = updates
        .iter()
        .position(|u| matches!(u, ViewerUpdate::Closed { .. }))
        .expect("session should be closed");
    assert_eq!(closed, updates.len() - 2);
    assert!(!updates.iter().any(|u| matches!(u, ViewerUpdate::PageCount { .. })));
    match updates.last() {
        Some(ViewerUpdate::OpenFailed { message, .. }) => assert!(message.contains("corrupt")),
        other => panic!("unexpected update {:?}", other),
    }

    // Auto-play was either never armed or switched off with the session
    let enabled = updates
        .iter()
        .filter_map(|u| match u {
            ViewerUpdate::AutoPlayChanged { enabled } => Some(*enabled),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert!(enabled.is_empty() || enabled == vec![true, false]);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(handle.try_recv().is_none());

    handle.send(ViewerCommand::Advance).unwrap();
    handle.send(ViewerCommand::ToggleBookmark).unwrap();
    let updates = recv_until(&mut handle, |u| matches!(u, ViewerUpdate::Error { .. })).await;
    assert_eq!(updates.len(), 1);
}

#[tokio::test]
async fn test_end_key_jumps_to_last_spread() {
    let mut handle = start(FakeDecoder::new(10));
    open_and_render(&mut handle, "ten-pages").await;

    handle.send(ViewerCommand::Key { key: Key::End }).unwrap();
    let updates = recv_until(&mut handle, |u| {
        matches!(u, ViewerUpdate::SpreadChanged { .. })
    })
    .await;
    match last_spread(&updates) {
        Some((left, Some(right))) => assert_eq!((left.index(), right.index()), (9, 10)),
        other => panic!("unexpected spread {:?}", other),
    }
}

#[tokio::test]
async fn test_bookmark_commands() {
    let mut handle = start(FakeDecoder::new(10));
    let opened = open_and_render(&mut handle, "ten-pages").await;
    assert!(opened.iter().any(|u| matches!(
        u,
        ViewerUpdate::BookmarksChanged { pages } if pages.is_empty()
    )));

    handle.send(ViewerCommand::ToggleBookmark).unwrap();
    let updates =
        recv_until(&mut handle, |u| matches!(u, ViewerUpdate::BookmarksChanged { .. })).await;
    assert!(matches!(
        updates.last(),
        Some(ViewerUpdate::BookmarksChanged { pages }) if pages == &vec![1]
    ));

    handle.send(ViewerCommand::AddBookmark { page: 1 }).unwrap();
    let updates =
        recv_until(&mut handle, |u| matches!(u, ViewerUpdate::BookmarkExists { .. })).await;
    assert!(matches!(updates.last(), Some(ViewerUpdate::BookmarkExists { page: 1 })));

    handle.send(ViewerCommand::AddBookmark { page: 5 }).unwrap();
    handle.send(ViewerCommand::RemoveBookmark { page: 1 }).unwrap();
    let updates = recv_until(&mut handle, |u| {
        matches!(u, ViewerUpdate::BookmarksChanged { pages } if pages == &vec![5])
    })
    .await;
    assert!(updates.iter().any(|u| matches!(
        u,
        ViewerUpdate::BookmarksChanged { pages } if pages == &vec![1, 5]
    )));

    handle.send(ViewerCommand::AddBookmark { page: 42 }).unwrap();
    let updates = recv_until(&mut handle, |u| matches!(u, ViewerUpdate::Error { .. })).await;
    assert_eq!(updates.len(), 1);
}

#[tokio::test]
async fn test_reopen_restores_last_read_page() {
    let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let mut handle = start_with(FakeDecoder::new(10), backend);
    open_and_render(&mut handle, "course-notes").await;

    handle.send(ViewerCommand::Goto { page: 7 }).unwrap();
    handle.send(ViewerCommand::AddBookmark { page: 3 }).unwrap();
    handle.send(ViewerCommand::Close).unwrap();
    recv_until(&mut handle, |u| matches!(u, ViewerUpdate::Closed { .. })).await;

    let updates = open_and_render(&mut handle, "course-notes").await;
    let first_spread = updates.iter().find_map(|u| match u {
        ViewerUpdate::SpreadChanged { left, .. } => Some(left.index()),
        _ => None,
    });
    assert_eq!(first_spread, Some(7));
    assert!(updates.iter().any(|u| matches!(
        u,
        ViewerUpdate::BookmarksChanged { pages } if pages == &vec![3]
    )));
}

#[tokio::test]
async fn test_failed_bookmark_write_degrades_once() {
    let mut handle = start_with(FakeDecoder::new(4), Arc::new(ReadOnlyStore));
    open_and_render(&mut handle, "read-only").await;

    handle.send(ViewerCommand::ToggleBookmark).unwrap();
    let updates = recv_until(&mut handle, |u| {
        matches!(u, ViewerUpdate::PersistenceDegraded { .. })
    })
    .await;
    assert!(updates.iter().any(|u| matches!(
        u,
        ViewerUpdate::BookmarksChanged { pages } if pages == &vec![1]
    )));

    // Still usable in memory, without a second warning
    handle.send(ViewerCommand::AddBookmark { page: 3 }).unwrap();
    let updates =
        recv_until(&mut handle, |u| matches!(u, ViewerUpdate::BookmarksChanged { .. })).await;
    assert_eq!(updates.len(), 1);
    handle.send(ViewerCommand::ZoomIn).unwrap();
    let updates =
        recv_until(&mut handle, |u| matches!(u, ViewerUpdate::ViewportChanged { .. })).await;
    assert_eq!(updates.len(), 1);
}

#[tokio::test]
async fn test_fetch_failure_is_reported() {
    let mut handle = start(FakeDecoder::new(1));
    handle
        .send(ViewerCommand::Open {
            source: DocumentSource::File("/definitely/not/here.pdf".into()),
        })
        .unwrap();
    let updates = recv_until(&mut handle, |u| matches!(u, ViewerUpdate::FetchFailed { .. })).await;
    assert!(matches!(updates[0], ViewerUpdate::Loading { .. }));
    assert!(matches!(
        updates.last(),
        Some(ViewerUpdate::FetchFailed {
            retryable: true,
            ..
        })
    ));

    handle
        .send(ViewerCommand::Open {
            source: DocumentSource::memory("empty", Vec::<u8>::new()),
        })
        .unwrap();
    let updates = recv_until(&mut handle, |u| matches!(u, ViewerUpdate::FetchFailed { .. })).await;
    assert!(matches!(
        updates.last(),
        Some(ViewerUpdate::FetchFailed {
            retryable: false,
            ..
        })
    ));
}

#[tokio::test]
async fn test_viewport_commands() {
    let mut handle = start(FakeDecoder::new(1));

    handle.send(ViewerCommand::ZoomIn).unwrap();
    handle.send(ViewerCommand::ZoomIn).unwrap();
    handle.send(ViewerCommand::FitPage).unwrap();
    let mut seen = Vec::new();
    for _ in 0..3 {
        match handle.recv().await {
            Some(ViewerUpdate::ViewportChanged { zoom, fit_mode }) => seen.push((zoom, fit_mode)),
            other => panic!("unexpected update {:?}", other),
        }
    }
    assert_eq!(
        seen,
        vec![
            (1.25, FitMode::Auto),
            (1.5, FitMode::Auto),
            (1.0, FitMode::Page)
        ]
    );
}

#[tokio::test]
async fn test_export_original_and_print() {
    let dir = TempDir::new().unwrap();
    let mut handle = start(FakeDecoder::new(3));
    open_and_render(&mut handle, "handout").await;

    let copy = dir.path().join("copy.pdf");
    handle
        .send(ViewerCommand::ExportOriginal { path: copy.clone() })
        .unwrap();
    recv_until(&mut handle, |u| matches!(u, ViewerUpdate::Exported { .. })).await;
    assert_eq!(std::fs::read(&copy).unwrap(), FAKE_BYTES);

    let print = dir.path().join("print.pdf");
    handle
        .send(ViewerCommand::ExportPrint {
            path: print.clone(),
            dpi: 150.0,
        })
        .unwrap();
    recv_until(&mut handle, |u| matches!(u, ViewerUpdate::Exported { .. })).await;
    assert!(std::fs::read(&print).unwrap().starts_with(b"%PDF"));
}
