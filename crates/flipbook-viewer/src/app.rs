use eframe::egui;
use flipbook_async_runtime::{DocumentId, ViewerHandle, ViewerUpdate};
use flipbook_viewer::AppLogger;
use std::path::PathBuf;
use std::time::Duration;

use crate::views::{FlipView, ViewerState, open_path, show_viewer};

#[derive(Clone)]
struct LoadingState {
    name: String,
    ready: u32,
    total: u32,
}

pub struct FlipbookApp {
    handle: ViewerHandle,
    logger: AppLogger,
    status: String,
    render_scale: f32,

    // Progress tracking
    loading: Option<LoadingState>,
    last_path: Option<PathBuf>,
    retry_path: Option<PathBuf>,

    viewer_state: Option<ViewerState>,
    show_log: bool,

    // Keeps the worker's runtime alive for the lifetime of the window
    _runtime: tokio::runtime::Runtime,
}

impl FlipbookApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        runtime: tokio::runtime::Runtime,
        handle: ViewerHandle,
        logger: AppLogger,
        render_scale: f32,
        initial_path: Option<PathBuf>,
    ) -> Self {
        let mut app = Self {
            handle,
            logger,
            status: String::new(),
            render_scale,
            loading: None,
            last_path: None,
            retry_path: None,
            viewer_state: None,
            show_log: false,
            _runtime: runtime,
        };
        if let Some(path) = initial_path {
            app.open(path);
        }
        app
    }

    fn open(&mut self, path: PathBuf) {
        self.last_path = Some(path.clone());
        self.retry_path = None;
        open_path(&self.handle, path, &mut self.status);
    }

    /// Viewer state for `doc_id`, ignoring updates from a document already closed
    fn state_for(&mut self, doc_id: DocumentId) -> Option<&mut ViewerState> {
        self.viewer_state
            .as_mut()
            .filter(|state| state.doc_id == doc_id)
    }

    fn apply_update(&mut self, ctx: &egui::Context, update: ViewerUpdate) {
        match update {
            ViewerUpdate::Loading { name } => {
                self.status = format!("Loading {}...", name);
                self.loading = Some(LoadingState {
                    name,
                    ready: 0,
                    total: 0,
                });
            }
            ViewerUpdate::Opened {
                doc_id,
                name,
                metadata,
                ..
            } => {
                let title = metadata.and_then(|m| m.title).unwrap_or(name);
                self.status = format!("Opened {}", title);
                self.viewer_state = Some(ViewerState::new(doc_id, title, self.render_scale));
            }
            ViewerUpdate::PageCount {
                doc_id,
                total_pages,
            } => {
                if let Some(state) = self.state_for(doc_id) {
                    state.total_pages = total_pages;
                }
                if let Some(loading) = &mut self.loading {
                    loading.total = total_pages;
                }
            }
            ViewerUpdate::PageReady { doc_id, page, .. } => {
                if let Some(state) = self.state_for(doc_id) {
                    state.add_page(ctx, &page);
                }
                if let Some(loading) = &mut self.loading {
                    loading.ready += 1;
                }
            }
            ViewerUpdate::PageFailed { index, message, .. } => {
                self.status = format!("Page {} could not be rendered: {}", index, message);
                if let Some(loading) = &mut self.loading {
                    loading.ready += 1;
                }
            }
            ViewerUpdate::RasterFinished { ready, failed, .. } => {
                self.loading = None;
                self.status = if failed == 0 {
                    format!("Rendered {} pages", ready)
                } else {
                    format!("Rendered {} pages, {} failed", ready, failed)
                };
            }
            ViewerUpdate::SpreadChanged {
                doc_id,
                left,
                right,
            } => {
                if let Some(state) = self.state_for(doc_id) {
                    state.goto_page = left.index();
                    state.left = left;
                    state.right = right;
                }
            }
            ViewerUpdate::FlipStarted {
                doc_id,
                direction,
                target,
            } => {
                if let Some(state) = self.state_for(doc_id) {
                    state.flip = Some(FlipView {
                        direction,
                        target,
                        progress: 0.0,
                        slices: Vec::new(),
                    });
                }
            }
            ViewerUpdate::FlipFrame {
                doc_id,
                progress,
                slices,
                ..
            } => {
                if let Some(flip) = self.state_for(doc_id).and_then(|s| s.flip.as_mut()) {
                    flip.progress = progress;
                    flip.slices = slices;
                }
            }
            ViewerUpdate::FlipCommitted { doc_id, .. } => {
                if let Some(state) = self.state_for(doc_id) {
                    state.flip = None;
                }
            }
            ViewerUpdate::AutoPlayChanged { enabled } => {
                if let Some(state) = &mut self.viewer_state {
                    state.autoplay = enabled;
                }
            }
            ViewerUpdate::BookmarksChanged { pages } => {
                if let Some(state) = &mut self.viewer_state {
                    state.bookmarks = pages;
                }
            }
            ViewerUpdate::BookmarkExists { page } => {
                self.status = format!("Page {} is already bookmarked", page);
            }
            ViewerUpdate::PersistenceDegraded { message } => {
                self.status = message;
            }
            ViewerUpdate::ViewportChanged { zoom, fit_mode } => {
                if let Some(state) = &mut self.viewer_state {
                    state.set_viewport(zoom, fit_mode);
                }
            }
            ViewerUpdate::Exported { path } => {
                self.status = format!("Saved {}", path.display());
            }
            ViewerUpdate::FetchFailed { message, retryable } => {
                self.loading = None;
                self.status = format!("Could not load document: {}", message);
                self.retry_path = if retryable {
                    self.last_path.clone()
                } else {
                    None
                };
            }
            ViewerUpdate::OpenFailed { message, .. } => {
                self.loading = None;
                self.status = format!("Could not open document: {}", message);
                self.retry_path = self.last_path.clone();
            }
            ViewerUpdate::Error { message } => {
                self.status = format!("Error: {message}");
            }
            ViewerUpdate::Closed { doc_id } => {
                if self.state_for(doc_id).is_some() {
                    self.viewer_state = None;
                    self.loading = None;
                    self.status = "Closed document".to_string();
                }
            }
        }
    }
}

impl eframe::App for FlipbookApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle drag-and-drop for PDF files
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("pdf"))
                .collect()
        });
        if let Some(path) = dropped.into_iter().next() {
            self.open(path);
        }

        // Process all pending updates from worker
        while let Some(update) = self.handle.try_recv() {
            self.apply_update(ctx, update);
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(loading) = &self.loading {
                    ui.label(&loading.name);
                    ui.add(
                        egui::ProgressBar::new(loading.ready as f32 / loading.total.max(1) as f32)
                            .desired_width(160.0)
                            .show_percentage(),
                    );
                }
                if let Some(path) = self.retry_path.clone() {
                    if ui.button("Retry").clicked() {
                        self.open(path);
                    }
                }
                let text = if self.status.is_empty() {
                    self.logger.latest_message().unwrap_or_default()
                } else {
                    self.status.clone()
                };
                ui.label(text);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.toggle_value(&mut self.show_log, "Log");
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            show_viewer(ui, &mut self.viewer_state, &self.handle, &mut self.status);
        });

        if self.show_log {
            egui::Window::new("Log")
                .open(&mut self.show_log)
                .default_size([520.0, 300.0])
                .show(ctx, |ui| {
                    if ui.button("Clear").clicked() {
                        self.logger.clear();
                    }
                    ui.separator();
                    egui::ScrollArea::vertical()
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in self.logger.get_entries() {
                                ui.monospace(entry.to_string());
                            }
                        });
                });
        }

        // The worker cannot wake the UI, so keep polling; faster while pages move
        let busy = self.loading.is_some()
            || self
                .viewer_state
                .as_ref()
                .is_some_and(|s| s.flip.is_some() || s.autoplay);
        ctx.request_repaint_after(Duration::from_millis(if busy { 16 } else { 100 }));
    }
}
