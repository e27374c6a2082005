//! Shared constants for the flipbook viewer
//!
//! This module centralizes the tuning numbers used by rasterization,
//! the flip animation and the viewport.

// =============================================================================
// Rasterization
// =============================================================================

/// Render scale applied to each page (legibility vs. memory)
pub const DEFAULT_RENDER_SCALE: f32 = 2.5;

// =============================================================================
// Flip Animation
// =============================================================================

/// Number of vertical slices a turning page is split into
pub const DEFAULT_SLICE_COUNT: u32 = 25;

/// Duration of a single page turn in milliseconds
pub const DEFAULT_FLIP_DURATION_MS: u64 = 800;

/// Frame sampling period in milliseconds (~60 fps)
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Peak lift of the outer edge during a turn, in pixels
pub const DEFAULT_MAX_ELEVATION: f32 = 40.0;

/// Slices at the spine still rotate by this share of the full turn
pub const SPINE_ROTATION_SHARE: f32 = 0.3;

/// Brightness drop (percentage points) when a slice stands perpendicular
pub const MAX_SHADE: f32 = 30.0;

// =============================================================================
// Auto-play
// =============================================================================

/// Delay between automatic page turns in milliseconds
pub const DEFAULT_AUTOPLAY_INTERVAL_MS: u64 = 3000;

// =============================================================================
// Viewport
// =============================================================================

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.25;
pub const DEFAULT_ZOOM: f32 = 1.0;

// =============================================================================
// Export
// =============================================================================

/// Resolution assumed when placing rendered pages into a print PDF
pub const DEFAULT_PRINT_DPI: f32 = 180.0;

/// Points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert a pixel length at `dpi` to points
#[inline]
pub fn px_to_pt(px: u32, dpi: f32) -> f32 {
    px as f32 * POINTS_PER_INCH / dpi
}
