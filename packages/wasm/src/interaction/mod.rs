//! Pointer and touch interaction: press disambiguation and drag-to-reparent.

mod drag;
mod press;

use serde::{Deserialize, Serialize};

pub use drag::{DragDropController, DragSession, DragState, DropOutcome, ReleaseOutcome, validate_drop};
pub use press::{PointerKind, PressOutcome, PressTracker, Promotion};

/// Thresholds for press disambiguation and hit testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionConfig {
    /// Touch hold time that promotes a press to a drag.
    pub long_press_ms: f64,
    /// Touch displacement (screen px) that promotes a press to a drag.
    /// A release below this and below the hold time is a tap.
    pub tap_slop: f32,
    /// Mouse displacement (screen px) that starts a drag.
    pub mouse_drag_threshold: f32,
    /// Extra logical distance around a card that still counts as a hit.
    pub hit_slop: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 300.0,
            tap_slop: 10.0,
            mouse_drag_threshold: 3.0,
            hit_slop: 0.0,
        }
    }
}
