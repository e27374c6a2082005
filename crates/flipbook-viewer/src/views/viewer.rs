use eframe::egui;
use egui::{Align2, Color32, FontId, Rect, Sense, TextureHandle, Vec2, pos2, vec2};
use flipbook_async_runtime::{
    Direction, DocumentId, FitMode, Key, PageImage, PageView, SliceTransform, ViewerCommand,
    ViewerHandle,
};
use flipbook_core::ViewportController;
use std::collections::HashMap;

/// In-flight flip as last reported by the worker
#[derive(Clone)]
pub struct FlipView {
    pub direction: Direction,
    pub target: u32,
    pub progress: f32,
    pub slices: Vec<SliceTransform>,
}

pub struct ViewerState {
    pub doc_id: DocumentId,
    pub title: String,
    pub total_pages: u32,
    pub render_scale: f32,
    pub left: PageView,
    pub right: Option<PageView>,
    pub flip: Option<FlipView>,
    pub textures: HashMap<u32, TextureHandle>,
    pub bookmarks: Vec<u32>,
    pub autoplay: bool,
    pub viewport: ViewportController,
    pub goto_page: u32,
    pointer_down: bool,
    last_width: f32,
}

impl ViewerState {
    pub fn new(doc_id: DocumentId, title: String, render_scale: f32) -> Self {
        Self {
            doc_id,
            title,
            total_pages: 0,
            render_scale,
            left: PageView::Placeholder { index: 1 },
            right: None,
            flip: None,
            textures: HashMap::new(),
            bookmarks: Vec::new(),
            autoplay: false,
            viewport: ViewportController::default(),
            goto_page: 1,
            pointer_down: false,
            last_width: 0.0,
        }
    }

    pub fn add_page(&mut self, ctx: &egui::Context, page: &PageImage) {
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [page.width as usize, page.height as usize],
            page.rgba_bytes(),
        );
        let texture = ctx.load_texture(
            format!("page_{}", page.index),
            image,
            egui::TextureOptions::LINEAR,
        );
        self.textures.insert(page.index, texture);
    }

    /// Mirror the worker's zoom/fit state for local layout
    pub fn set_viewport(&mut self, zoom: f32, fit_mode: FitMode) {
        match fit_mode {
            FitMode::Width => self.viewport.fit_width(),
            FitMode::Page => self.viewport.fit_page(),
            FitMode::Auto => self.viewport.set_zoom(zoom),
        }
    }

    fn current_page(&self) -> u32 {
        self.left.index()
    }

    fn is_bookmarked(&self) -> bool {
        self.bookmarks.contains(&self.current_page())
    }

    /// Page size in points, taken from any rendered page
    fn page_size(&self) -> Vec2 {
        self.textures
            .get(&self.current_page())
            .or_else(|| self.textures.values().next())
            .map(|t| t.size_vec2() / self.render_scale)
            .unwrap_or(vec2(612.0, 792.0))
    }
}

pub fn show_viewer(
    ui: &mut egui::Ui,
    viewer_state: &mut Option<ViewerState>,
    handle: &ViewerHandle,
    status: &mut String,
) {
    let Some(state) = viewer_state else {
        show_open_prompt(ui, handle, status);
        return;
    };

    show_toolbar(ui, state, handle, status);
    ui.separator();
    forward_keys(ui, handle);

    let available = ui.available_size();
    let pages_in_spread = if state.right.is_some() { 2 } else { 1 };
    let page = state.page_size();
    let scale = state
        .viewport
        .display_scale((page.x, page.y), (available.x, available.y), pages_in_spread);
    let page_size = page * scale;

    egui::ScrollArea::both().show(ui, |ui| {
        let spread_size = vec2(
            (page_size.x * 2.0).max(available.x),
            page_size.y.max(available.y - 8.0),
        );
        let (rect, response) = ui.allocate_exact_size(spread_size, Sense::click_and_drag());
        forward_pointer(ui, state, handle, rect, &response);

        let spine = rect.center().x;
        let top = rect.center().y - page_size.y / 2.0;
        let left_rect = Rect::from_min_size(pos2(spine - page_size.x, top), page_size);
        let right_rect = Rect::from_min_size(pos2(spine, top), page_size);

        let painter = ui.painter_at(rect);
        match state.flip.clone() {
            Some(flip) => draw_flip(&painter, state, &flip, left_rect, right_rect),
            None => {
                draw_page(&painter, state, Some(&state.left), left_rect);
                draw_page(&painter, state, state.right.as_ref(), right_rect);
            }
        }
    });
}

fn show_open_prompt(ui: &mut egui::Ui, handle: &ViewerHandle, status: &mut String) {
    ui.vertical_centered(|ui| {
        ui.add_space(50.0);
        ui.heading("Flipbook");
        ui.add_space(20.0);
        ui.label("Drop a PDF file here or click to open");
        ui.add_space(10.0);

        if ui.button("Open PDF...").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("PDF", &["pdf"])
                .pick_file()
            {
                open_path(handle, path, status);
            }
        }
    });
}

pub fn open_path(handle: &ViewerHandle, path: std::path::PathBuf, status: &mut String) {
    let source = flipbook_async_runtime::DocumentSource::File(path);
    *status = format!("Loading {}...", source.display_name());
    let _ = handle.send(ViewerCommand::Open { source });
}

fn show_toolbar(
    ui: &mut egui::Ui,
    state: &mut ViewerState,
    handle: &ViewerHandle,
    status: &mut String,
) {
    let flipping = state.flip.is_some();
    let current = state.current_page();
    let last_start = flipbook_core::spread::last_spread_start(state.total_pages);

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(&state.title).strong());
        ui.separator();

        if ui
            .add_enabled(!flipping && current > 1, egui::Button::new("◀ Previous"))
            .clicked()
        {
            let _ = handle.send(ViewerCommand::Retreat);
        }

        let label = match (&state.flip, &state.right) {
            (Some(flip), _) => format!(
                "Turning to page {} ({:.0}%)",
                flip.target,
                flip.progress * 100.0
            ),
            (None, Some(right)) => {
                format!("Pages {}–{} of {}", current, right.index(), state.total_pages)
            }
            (None, None) => format!("Page {} of {}", current, state.total_pages),
        };
        ui.label(label);

        if ui
            .add_enabled(
                !flipping && state.total_pages > 0 && current < last_start,
                egui::Button::new("Next ▶"),
            )
            .clicked()
        {
            let _ = handle.send(ViewerCommand::Advance);
        }

        ui.separator();
        ui.add(egui::DragValue::new(&mut state.goto_page).range(1..=state.total_pages.max(1)));
        if ui.add_enabled(!flipping, egui::Button::new("Go")).clicked() {
            let _ = handle.send(ViewerCommand::Goto {
                page: state.goto_page,
            });
        }

        ui.separator();
        if ui.checkbox(&mut state.autoplay, "Auto-play").changed() {
            let _ = handle.send(ViewerCommand::SetAutoPlay {
                enabled: state.autoplay,
            });
        }
    });

    ui.horizontal(|ui| {
        let star = if state.is_bookmarked() { "★ Bookmarked" } else { "☆ Bookmark" };
        if ui.button(star).clicked() {
            let _ = handle.send(ViewerCommand::ToggleBookmark);
        }

        egui::ComboBox::from_id_salt("bookmarks")
            .selected_text(format!("{} bookmarks", state.bookmarks.len()))
            .show_ui(ui, |ui| {
                for &page in &state.bookmarks {
                    if ui.selectable_label(false, format!("Page {}", page)).clicked() {
                        let _ = handle.send(ViewerCommand::Goto { page });
                    }
                }
            });

        ui.separator();
        if ui.button("−").clicked() {
            let _ = handle.send(ViewerCommand::ZoomOut);
        }
        ui.label(format!("{:.0}%", state.viewport.zoom() * 100.0));
        if ui.button("+").clicked() {
            let _ = handle.send(ViewerCommand::ZoomIn);
        }
        let fit = state.viewport.fit_mode();
        if ui.selectable_label(fit == FitMode::Width, "Fit width").clicked() {
            let _ = handle.send(ViewerCommand::FitWidth);
        }
        if ui.selectable_label(fit == FitMode::Page, "Fit page").clicked() {
            let _ = handle.send(ViewerCommand::FitPage);
        }

        ui.separator();
        if ui.button("Save copy...").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("PDF", &["pdf"])
                .set_file_name(&state.title)
                .save_file()
            {
                let _ = handle.send(ViewerCommand::ExportOriginal { path });
                *status = "Saving...".to_string();
            }
        }
        if ui.button("Print...").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("PDF", &["pdf"])
                .set_file_name("print.pdf")
                .save_file()
            {
                let _ = handle.send(ViewerCommand::ExportPrint {
                    path,
                    dpi: flipbook_core::constants::DEFAULT_PRINT_DPI,
                });
                *status = "Preparing print...".to_string();
            }
        }
        if ui.button("Close").clicked() {
            let _ = handle.send(ViewerCommand::Close);
        }
    });
}

fn forward_keys(ui: &egui::Ui, handle: &ViewerHandle) {
    let keys = [
        (egui::Key::ArrowLeft, Key::ArrowLeft),
        (egui::Key::ArrowRight, Key::ArrowRight),
        (egui::Key::Home, Key::Home),
        (egui::Key::End, Key::End),
    ];
    ui.input(|i| {
        for (egui_key, key) in keys {
            if i.key_pressed(egui_key) {
                let _ = handle.send(ViewerCommand::Key { key });
            }
        }
    });
}

fn forward_pointer(
    ui: &egui::Ui,
    state: &mut ViewerState,
    handle: &ViewerHandle,
    rect: Rect,
    response: &egui::Response,
) {
    if (rect.width() - state.last_width).abs() > f32::EPSILON {
        state.last_width = rect.width();
        let _ = handle.send(ViewerCommand::SetViewerWidth {
            width: rect.width(),
        });
    }

    let (pressed, released, pos) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.interact_pos(),
        )
    });
    let Some(pos) = pos else {
        return;
    };
    let local = pos - rect.min;

    if pressed && response.hovered() {
        state.pointer_down = true;
        let _ = handle.send(ViewerCommand::PointerDown {
            x: local.x,
            y: local.y,
        });
    } else if state.pointer_down && released {
        state.pointer_down = false;
        let _ = handle.send(ViewerCommand::PointerUp {
            x: local.x,
            y: local.y,
        });
    } else if state.pointer_down && !response.hovered() && !response.dragged() {
        state.pointer_down = false;
        let _ = handle.send(ViewerCommand::PointerCancel);
    } else if state.pointer_down && response.dragged() {
        let _ = handle.send(ViewerCommand::PointerMove {
            x: local.x,
            y: local.y,
        });
    }
}

fn draw_page(painter: &egui::Painter, state: &ViewerState, view: Option<&PageView>, rect: Rect) {
    let Some(view) = view else {
        return;
    };
    match view {
        PageView::Ready(page) => match state.textures.get(&page.index) {
            Some(texture) => {
                painter.image(texture.id(), rect, full_uv(), Color32::WHITE);
            }
            None => draw_placeholder(painter, rect, &format!("Page {}", page.index)),
        },
        PageView::Placeholder { index } => {
            draw_placeholder(painter, rect, &format!("Page {} loading…", index));
        }
        PageView::Unavailable { index, reason } => {
            painter.rect_filled(rect, 0.0, Color32::from_rgb(70, 40, 40));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                format!("Page {} unavailable\n{}", index, reason),
                FontId::proportional(14.0),
                Color32::LIGHT_RED,
            );
        }
    }
}

fn draw_placeholder(painter: &egui::Painter, rect: Rect, label: &str) {
    painter.rect_filled(rect, 0.0, Color32::from_gray(60));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        label,
        FontId::proportional(16.0),
        Color32::from_gray(180),
    );
}

fn full_uv() -> Rect {
    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0))
}

/// Draw the spread underneath plus the turning sheet, slice by slice
fn draw_flip(
    painter: &egui::Painter,
    state: &ViewerState,
    flip: &FlipView,
    left_rect: Rect,
    right_rect: Rect,
) {
    let current = state.current_page();

    // Pages revealed under the sheet, the sheet's two sides, and which way it starts
    let (under_left, under_right, front, back, outward) = match flip.direction {
        Direction::Backward => (
            flip.target,
            current + 1,
            current,
            current.saturating_sub(1),
            -1.0,
        ),
        _ => (current, flip.target + 1, current + 1, flip.target, 1.0),
    };
    draw_index(painter, state, under_left, left_rect);
    draw_index(painter, state, under_right, right_rect);

    let slice_count = flip.slices.len().max(1) as f32;
    let slice_width = right_rect.width() / slice_count;
    let mut x = right_rect.left();

    for slice in &flip.slices {
        let i = slice.index as f32;
        let past_spine = slice.is_past_spine();
        let heading = if past_spine { -outward } else { outward };
        let next_x = x + slice_width * slice.projected_width_factor() * heading;

        let page = if past_spine { back } else { front };
        // The spine is a page's left edge on the right half and its right edge on the left half
        let on_right = past_spine == (outward < 0.0);
        let (u0, u1) = if on_right {
            (i / slice_count, (i + 1.0) / slice_count)
        } else {
            (1.0 - (i + 1.0) / slice_count, 1.0 - i / slice_count)
        };

        let lift = slice.elevation * 0.25;
        let slice_rect = Rect::from_x_y_ranges(
            x.min(next_x)..=x.max(next_x),
            (right_rect.top() - lift)..=(right_rect.bottom() - lift),
        );
        let shade = (slice.brightness / 100.0 * 255.0).clamp(0.0, 255.0) as u8;

        match state.textures.get(&page) {
            Some(texture) => {
                let uv = Rect::from_min_max(pos2(u0, 0.0), pos2(u1, 1.0));
                painter.image(texture.id(), slice_rect, uv, Color32::from_gray(shade));
            }
            None => {
                painter.rect_filled(slice_rect, 0.0, Color32::from_gray(shade / 3));
            }
        }
        x = next_x;
    }
}

fn draw_index(painter: &egui::Painter, state: &ViewerState, index: u32, rect: Rect) {
    if index == 0 || index > state.total_pages {
        return;
    }
    match state.textures.get(&index) {
        Some(texture) => {
            painter.image(texture.id(), rect, full_uv(), Color32::WHITE);
        }
        None => draw_placeholder(painter, rect, &format!("Page {}", index)),
    }
}
