//! Pointer and keyboard translation into navigation intents
//!
//! The controller never touches navigation state; it only produces
//! `NavIntent`s for the flip engine's owner to apply.

use crate::spread;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavIntent {
    Advance,
    Retreat,
    Goto(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Other,
}

impl Key {
    /// Parse a DOM-style key name
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "Home" => Key::Home,
            "End" => Key::End,
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputController {
    viewer_width: f32,
    total_pages: u32,
    drag_origin: Option<(f32, f32)>,
}

impl InputController {
    pub fn new(viewer_width: f32) -> Self {
        Self {
            viewer_width,
            ..Default::default()
        }
    }

    pub fn set_viewer_width(&mut self, width: f32) {
        self.viewer_width = width.max(0.0);
    }

    pub fn set_page_count(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Arms drag mode; has no navigation effect on its own
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.drag_origin = Some((x, y));
    }

    pub fn pointer_move(&mut self, _x: f32, _y: f32) {}

    /// Picks a direction from the side of the midline the pointer was released on.
    /// A plain click goes through the same path as a drag.
    pub fn pointer_up(&mut self, x: f32, _y: f32) -> Option<NavIntent> {
        self.drag_origin.take()?;
        if x >= self.viewer_width / 2.0 {
            Some(NavIntent::Advance)
        } else {
            Some(NavIntent::Retreat)
        }
    }

    /// Pointer left the viewer or the gesture was cancelled by the host
    pub fn pointer_cancel(&mut self) {
        self.drag_origin = None;
    }

    pub fn key(&self, key: Key) -> Option<NavIntent> {
        match key {
            Key::ArrowRight => Some(NavIntent::Advance),
            Key::ArrowLeft => Some(NavIntent::Retreat),
            Key::Home => Some(NavIntent::Goto(1)),
            Key::End => Some(NavIntent::Goto(spread::last_spread_start(self.total_pages))),
            Key::Other => None,
        }
    }
}
