//! Screen projection of guides for overlay hinting.

use super::{FrontierGuide, GuideDirection};
use crate::core::{Orientation, yaw_delta};

/// Screen and camera geometry used to place guide markers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Screen width (pixels)
    pub width: f32,
    /// Screen height (pixels)
    pub height: f32,
    /// Horizontal field of view spanning the screen width (degrees)
    pub h_fov: f32,
    /// Vertical field of view spanning the screen height (degrees)
    pub v_fov: f32,
    /// Inset from each edge inside which a marker counts as visible (pixels)
    pub margin: f32,
}

/// A guide's position on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub visible: bool,
}

/// Project a guide onto the screen for the current orientation.
///
/// Uses a linear angle-to-pixel mapping around the screen center, with yaw
/// taking the short way round. Points may land off-screen.
pub fn project_guide(
    guide: &FrontierGuide,
    current: &Orientation,
    viewport: &Viewport,
) -> ScreenPoint {
    let d_yaw = yaw_delta(current.yaw, guide.yaw);
    let d_pitch = guide.pitch - current.pitch;

    let x = viewport.width / 2.0 + d_yaw / viewport.h_fov * viewport.width;
    // Screen y grows downward
    let y = viewport.height / 2.0 - d_pitch / viewport.v_fov * viewport.height;

    let m = viewport.margin;
    let visible = x >= m && x <= viewport.width - m && y >= m && y <= viewport.height - m;

    ScreenPoint { x, y, visible }
}

/// Direction to turn toward an off-screen guide.
pub fn hint_direction(current: &Orientation, guide: &FrontierGuide) -> GuideDirection {
    GuideDirection::from_delta(yaw_delta(current.yaw, guide.yaw), guide.pitch - current.pitch)
}
