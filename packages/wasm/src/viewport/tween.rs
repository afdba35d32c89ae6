//! Generation-counted viewport tweens.
//!
//! Every animation request gets a fresh generation. Frame callbacks carry
//! the generation they were started with; a callback from a superseded
//! request is ignored instead of racing the newer one.

use serde::{Deserialize, Serialize};

use super::ViewportState;

/// Token returned to the host when an animation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationHandle {
    pub generation: u64,
}

/// What a frame callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameStatus {
    /// The callback belongs to a superseded or finished animation; nothing was written.
    Stale,
    /// State was written; request another frame.
    Running,
    /// Final state was written; stop requesting frames.
    Finished,
}

/// A linear interpolation from one viewport state to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub generation: u64,
    pub from: ViewportState,
    pub to: ViewportState,
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl Tween {
    /// Progress in `[0, 1]` at `now_ms`.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Interpolated state at `now_ms` and whether the tween is complete.
    pub fn sample(&self, now_ms: f64) -> (ViewportState, bool) {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            (self.to, true)
        } else {
            (self.from.lerp(&self.to, t), false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::Point;

    fn tween() -> Tween {
        Tween {
            generation: 1,
            from: ViewportState::default(),
            to: ViewportState {
                zoom: 0.5,
                pan: Point::new(100.0, -40.0),
            },
            start_ms: 1000.0,
            duration_ms: 200.0,
        }
    }

    #[test]
    fn test_sample_is_linear() {
        let (mid, done) = tween().sample(1100.0);
        assert!(!done);
        assert!((mid.zoom - 0.75).abs() < 1e-6);
        assert!((mid.pan.x - 50.0).abs() < 1e-4);
        assert!((mid.pan.y + 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_sample_clamps_at_end() {
        let t = tween();
        let (end, done) = t.sample(5000.0);
        assert!(done);
        assert_eq!(end, t.to);
        assert_eq!(t.progress(0.0), 0.0);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let t = Tween {
            duration_ms: 0.0,
            ..tween()
        };
        assert!(t.sample(1000.0).1);
    }
}
