//! Per-slice curl approximation
//!
//! A turning page is cut into vertical slices. Each slice gets an
//! independent rigid rotation, a lift and a shade; slices far from the spine
//! rotate further than those next to it, which reads as a curl.

use super::ease::Ease;
use crate::constants::{MAX_SHADE, SPINE_ROTATION_SHARE};
use crate::types::Direction;
use serde::{Deserialize, Serialize};

/// Transform of one slice at a given animation fraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceTransform {
    pub index: u32,
    /// Rotation around the spine in degrees; negative for forward turns
    pub rotation_deg: f32,
    /// Lift off the page plane, in pixels
    pub elevation: f32,
    /// Percentage brightness, 100 when flat
    pub brightness: f32,
}

impl SliceTransform {
    /// Horizontal foreshortening of the slice as seen head-on
    pub fn projected_width_factor(&self) -> f32 {
        self.rotation_deg.to_radians().cos().abs()
    }

    /// True once the slice has crossed the spine and shows its back side
    pub fn is_past_spine(&self) -> bool {
        self.rotation_deg.abs() > 90.0
    }
}

pub fn slice_transform(
    progress: f32,
    index: u32,
    slice_count: u32,
    direction: Direction,
    max_elevation: f32,
) -> SliceTransform {
    let eased = Ease::InOutCubic.apply(progress);
    let slice_fraction = index as f32 / slice_count.max(1) as f32;
    let share = SPINE_ROTATION_SHARE + (1.0 - SPINE_ROTATION_SHARE) * slice_fraction;
    let rotation = eased * 180.0 * share;
    let lift = rotation.to_radians().sin();
    let sign = if direction == Direction::Forward { -1.0 } else { 1.0 };

    SliceTransform {
        index,
        rotation_deg: rotation * sign,
        elevation: lift * max_elevation * slice_fraction,
        brightness: 100.0 - lift.abs() * MAX_SHADE,
    }
}

/// Transforms for every slice, spine first
pub fn slice_transforms(
    progress: f32,
    slice_count: u32,
    direction: Direction,
    max_elevation: f32,
) -> Vec<SliceTransform> {
    (0..slice_count)
        .map(|i| slice_transform(progress, i, slice_count, direction, max_elevation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_at_rest() {
        for t in slice_transforms(0.0, 25, Direction::Forward, 40.0) {
            assert_eq!(t.rotation_deg, 0.0);
            assert_eq!(t.elevation, 0.0);
            assert_eq!(t.brightness, 100.0);
        }
    }

    #[test]
    fn outer_slices_rotate_further() {
        let slices = slice_transforms(0.4, 25, Direction::Backward, 40.0);
        for pair in slices.windows(2) {
            assert!(pair[1].rotation_deg > pair[0].rotation_deg);
        }
    }

    #[test]
    fn direction_flips_sign_only() {
        let fwd = slice_transform(0.3, 10, 25, Direction::Forward, 40.0);
        let back = slice_transform(0.3, 10, 25, Direction::Backward, 40.0);
        assert_eq!(fwd.rotation_deg, -back.rotation_deg);
        assert_eq!(fwd.elevation, back.elevation);
        assert_eq!(fwd.brightness, back.brightness);
    }

    #[test]
    fn spine_slice_never_lifts() {
        let spine = slice_transform(0.5, 0, 25, Direction::Forward, 40.0);
        assert_eq!(spine.elevation, 0.0);
        assert!(spine.rotation_deg < 0.0);
    }

    #[test]
    fn slices_narrow_toward_the_spine_crossing() {
        let flat = slice_transform(0.0, 24, 25, Direction::Forward, 40.0);
        assert_eq!(flat.projected_width_factor(), 1.0);

        let at = |rotation_deg| SliceTransform {
            index: 0,
            rotation_deg,
            elevation: 0.0,
            brightness: 100.0,
        };
        assert!(at(-90.0).projected_width_factor() < 1e-4);
        assert!(at(-45.0).projected_width_factor() > at(-80.0).projected_width_factor());

        let landed = at(-180.0);
        assert!(landed.is_past_spine());
        assert!((landed.projected_width_factor() - 1.0).abs() < 1e-4);
    }
}
