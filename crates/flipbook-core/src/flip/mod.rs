//! Page-turn animation
//!
//! The engine owns the navigation state machine (`Idle` / `Flipping`) and
//! commits spread changes; the geometry module computes the per-slice curl
//! for a given animation fraction.

pub mod ease;
mod engine;
pub mod geometry;

pub use engine::{FlipEngine, FlipOutcome, FlipState, FrameOutcome};
pub use geometry::{SliceTransform, slice_transform, slice_transforms};
