//! Gesture bookkeeping for pan, pinch and wheel input.

use serde::{Deserialize, Serialize};

use super::Point;

/// Snapshot taken when a pan gesture starts.
///
/// Pan is always derived from the snapshot plus the total pointer
/// displacement, so missed intermediate events cannot accumulate drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    pub pointer_origin: Point,
    pub pan_origin: Point,
}

impl PanGesture {
    pub fn new(pointer_origin: Point, pan_origin: Point) -> Self {
        Self {
            pointer_origin,
            pan_origin,
        }
    }

    /// Pan for the pointer at `pointer`.
    #[inline]
    pub fn pan_at(&self, pointer: Point) -> Point {
        self.pan_by(
            pointer.x - self.pointer_origin.x,
            pointer.y - self.pointer_origin.y,
        )
    }

    /// Pan for a total displacement since the gesture began.
    #[inline]
    pub fn pan_by(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.pan_origin.x + dx, self.pan_origin.y + dy)
    }
}

/// Snapshot taken when two touch points go down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    pub start_distance: f32,
    pub start_zoom: f32,
}

impl PinchGesture {
    pub fn new(start_distance: f32, start_zoom: f32) -> Self {
        Self {
            start_distance,
            start_zoom,
        }
    }

    /// Zoom for the current finger distance, clamped. None while the
    /// starting distance is degenerate.
    pub fn zoom_for(&self, distance: f32, min_zoom: f32, max_zoom: f32) -> Option<f32> {
        if self.start_distance <= f32::EPSILON {
            return None;
        }
        Some((self.start_zoom * distance / self.start_distance).clamp(min_zoom, max_zoom))
    }
}

/// DOM `WheelEvent.deltaMode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WheelDeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    /// Map the raw DOM constant. Unknown values are treated as pixels.
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }

    /// Zoom delta for a vertical wheel delta. Scrolling down zooms out.
    pub fn zoom_delta(self, delta_y: f32, pixel_divisor: f32, line_divisor: f32) -> f32 {
        match self {
            Self::Line => -delta_y / line_divisor,
            // Page deltas are rare enough to share the pixel scale.
            Self::Pixel | Self::Page => -delta_y / pixel_divisor,
        }
    }
}

/// Coalescing window for discrete zoom requests.
///
/// The first request opens the window and is applied; requests arriving
/// while it is open are dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomGate {
    closes_at_ms: f64,
}

impl ZoomGate {
    pub fn new() -> Self {
        Self {
            closes_at_ms: f64::NEG_INFINITY,
        }
    }

    /// Whether a request at `now_ms` is admitted. Admission opens a new window.
    pub fn admit(&mut self, now_ms: f64, window_ms: f64) -> bool {
        if now_ms < self.closes_at_ms {
            return false;
        }
        self.closes_at_ms = now_ms + window_ms;
        true
    }
}

impl Default for ZoomGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance between two touch points.
#[inline]
pub fn touch_distance(a: Point, b: Point) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Midpoint of two touch points.
#[inline]
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}
