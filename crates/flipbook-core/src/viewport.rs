use crate::constants::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use serde::{Deserialize, Serialize};

/// Policy mapping page dimensions to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    Width,
    Page,
    #[default]
    Auto,
}

/// Zoom and fit state, independent of the flip animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportController {
    zoom: f32,
    fit_mode: FitMode,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            fit_mode: FitMode::Auto,
        }
    }
}

impl ViewportController {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    /// Manual zoom overrides any fit heuristic
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        let snapped = (zoom / ZOOM_STEP).round() * ZOOM_STEP;
        self.zoom = snapped.clamp(MIN_ZOOM, MAX_ZOOM);
        self.fit_mode = FitMode::Auto;
    }

    pub fn fit_width(&mut self) {
        self.fit_mode = FitMode::Width;
        self.zoom = DEFAULT_ZOOM;
    }

    pub fn fit_page(&mut self) {
        self.fit_mode = FitMode::Page;
        self.zoom = DEFAULT_ZOOM;
    }

    /// Scale from page pixels to viewport pixels.
    /// `page` and `viewport` are (width, height); a spread lays pages side by side.
    pub fn display_scale(
        &self,
        page: (f32, f32),
        viewport: (f32, f32),
        pages_in_spread: u32,
    ) -> f32 {
        let spread_width = page.0 * pages_in_spread.max(1) as f32;
        if spread_width <= 0.0 || page.1 <= 0.0 {
            return self.zoom;
        }
        let width_fit = viewport.0 / spread_width;
        match self.fit_mode {
            FitMode::Width => width_fit,
            FitMode::Page => width_fit.min(viewport.1 / page.1),
            FitMode::Auto => self.zoom,
        }
    }
}
