use super::geometry::{SliceTransform, slice_transforms};
use crate::options::ViewerOptions;
use crate::spread;
use crate::types::{Direction, NavigationNoOp};
use std::time::Duration;
use tokio::time::Instant;

/// Navigation state. `FlipEngine` is its only writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipState {
    pub direction: Direction,
    pub progress: f32,
    pub is_animating: bool,
    pub current_left_page: u32,
    pub slice_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlipOutcome {
    /// A flip animation began towards `target`
    Started { direction: Direction, target: u32 },
    /// Direct jump without animation
    Jumped { page: u32 },
    Ignored(NavigationNoOp),
}

impl FlipOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, FlipOutcome::Ignored(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Idle,
    Progress(f32),
    /// The flip finished and the new spread is current
    Committed { page: u32 },
}

pub struct FlipEngine {
    state: FlipState,
    total_pages: u32,
    duration: Duration,
    max_elevation: f32,
    started_at: Option<Instant>,
    target: u32,
    shut_down: bool,
}

impl FlipEngine {
    pub fn new(options: &ViewerOptions) -> Self {
        Self {
            state: FlipState {
                direction: Direction::None,
                progress: 0.0,
                is_animating: false,
                current_left_page: 1,
                slice_count: options.slice_count,
            },
            total_pages: 0,
            duration: options.flip_duration(),
            max_elevation: options.max_elevation,
            started_at: None,
            target: 1,
            shut_down: false,
        }
    }

    pub fn with_page_count(options: &ViewerOptions, total_pages: u32) -> Self {
        let mut engine = Self::new(options);
        engine.set_page_count(total_pages);
        engine
    }

    pub fn state(&self) -> FlipState {
        self.state
    }

    pub fn current_page(&self) -> u32 {
        self.state.current_left_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_animating
    }

    pub fn is_at_first_spread(&self) -> bool {
        self.state.current_left_page <= 1
    }

    pub fn is_at_last_spread(&self) -> bool {
        self.state.current_left_page >= spread::last_spread_start(self.total_pages)
    }

    pub fn visible_pages(&self) -> (u32, Option<u32>) {
        spread::visible_pages(self.state.current_left_page, self.total_pages)
    }

    /// Called as the decoder reports the page count; clamps the current spread
    pub fn set_page_count(&mut self, total_pages: u32) {
        if self.shut_down {
            return;
        }
        self.total_pages = total_pages;
        if total_pages > 0 {
            self.state.current_left_page =
                spread::spread_start(self.state.current_left_page, total_pages);
            self.target = spread::spread_start(self.target, total_pages);
        }
    }

    pub fn advance(&mut self, now: Instant) -> FlipOutcome {
        self.begin(Direction::Forward, now)
    }

    pub fn retreat(&mut self, now: Instant) -> FlipOutcome {
        self.begin(Direction::Backward, now)
    }

    fn begin(&mut self, direction: Direction, now: Instant) -> FlipOutcome {
        if let Some(reason) = self.blocked() {
            return FlipOutcome::Ignored(reason);
        }
        let current = self.state.current_left_page;
        let target = match direction {
            Direction::Forward if self.total_pages > 0 && !self.is_at_last_spread() => {
                (current + 2).min(self.total_pages)
            }
            Direction::Backward if !self.is_at_first_spread() => current.saturating_sub(2).max(1),
            _ => return FlipOutcome::Ignored(NavigationNoOp::OutOfRange),
        };

        self.state.direction = direction;
        self.state.progress = 0.0;
        self.state.is_animating = true;
        self.started_at = Some(now);
        self.target = target;
        log::debug!("Flip {:?} from {} to {}", direction, current, target);
        FlipOutcome::Started { direction, target }
    }

    /// Jump straight to the spread containing `page`
    pub fn goto(&mut self, page: u32) -> FlipOutcome {
        if let Some(reason) = self.blocked() {
            return FlipOutcome::Ignored(reason);
        }
        if self.total_pages == 0 {
            return FlipOutcome::Ignored(NavigationNoOp::OutOfRange);
        }
        let target = spread::spread_start(page, self.total_pages);
        if target == self.state.current_left_page {
            return FlipOutcome::Ignored(NavigationNoOp::OutOfRange);
        }
        self.state.current_left_page = target;
        self.target = target;
        FlipOutcome::Jumped { page: target }
    }

    fn blocked(&self) -> Option<NavigationNoOp> {
        if self.shut_down {
            Some(NavigationNoOp::ShutDown)
        } else if self.state.is_animating {
            Some(NavigationNoOp::Animating)
        } else {
            None
        }
    }

    /// Sample the animation at `now`, committing once progress reaches 1
    pub fn frame(&mut self, now: Instant) -> FrameOutcome {
        if self.shut_down || !self.state.is_animating {
            return FrameOutcome::Idle;
        }
        let Some(started_at) = self.started_at else {
            return FrameOutcome::Idle;
        };

        let elapsed = now.saturating_duration_since(started_at);
        let progress = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0);

        if progress >= 1.0 {
            self.state.current_left_page = self.target.clamp(1, self.total_pages.max(1));
            self.state.is_animating = false;
            self.state.progress = 0.0;
            self.state.direction = Direction::None;
            self.started_at = None;
            FrameOutcome::Committed {
                page: self.state.current_left_page,
            }
        } else {
            self.state.progress = progress;
            FrameOutcome::Progress(progress)
        }
    }

    /// Geometry of the turning page at the current progress
    pub fn slices(&self) -> Vec<SliceTransform> {
        if !self.state.is_animating {
            return Vec::new();
        }
        slice_transforms(
            self.state.progress,
            self.state.slice_count,
            self.state.direction,
            self.max_elevation,
        )
    }

    /// Abort any in-flight flip; the engine ignores everything afterwards
    pub fn shutdown(&mut self) {
        if self.state.is_animating {
            log::debug!("Aborting flip at progress {:.2}", self.state.progress);
        }
        self.state.is_animating = false;
        self.state.progress = 0.0;
        self.state.direction = Direction::None;
        self.started_at = None;
        self.shut_down = true;
    }
}
