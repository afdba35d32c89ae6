//! Viewport transform over logical layout coordinates.
//!
//! The viewport maps logical coordinates to screen coordinates with a
//! uniform scale and a translation: `screen = logical * zoom + pan`. It
//! never writes back into layout output.

mod controller;
mod gesture;
mod tween;

use serde::{Deserialize, Serialize};

pub use controller::{ViewportConfig, ViewportController};
pub use gesture::{PanGesture, PinchGesture, WheelDeltaMode, ZoomGate, midpoint, touch_distance};
pub use tween::{AnimationHandle, FrameStatus, Tween};

/// A 2D point or vector in screen or logical space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Current zoom and pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: f32,
    pub pan: Point,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
        }
    }
}

impl ViewportState {
    /// Linear interpolation between two states, `t` in `[0, 1]`.
    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        Self {
            zoom: self.zoom + (to.zoom - self.zoom) * t,
            pan: Point::new(
                self.pan.x + (to.pan.x - self.pan.x) * t,
                self.pan.y + (to.pan.y - self.pan.y) * t,
            ),
        }
    }

    /// Map a screen point into logical space.
    #[inline]
    pub fn screen_to_logical(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    /// Map a logical point onto the screen.
    #[inline]
    pub fn logical_to_screen(&self, logical: Point) -> Point {
        Point::new(
            logical.x * self.zoom + self.pan.x,
            logical.y * self.zoom + self.pan.y,
        )
    }
}
