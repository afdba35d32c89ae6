//! Press disambiguation for touch and mouse input.
//!
//! A pressed card becomes a drag once either guard trips: the hold time
//! (touch only) or the displacement threshold. Both guards are evaluated
//! on every input, hold first, so the outcome depends only on the
//! timestamps and coordinates fed in and never on timer ordering.

use serde::{Deserialize, Serialize};

use super::InteractionConfig;
use crate::viewport::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Which guard promoted the press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Promotion {
    LongPress,
    Movement,
}

/// Result of releasing a press that was never promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Short and still: a tap.
    Tap,
    /// Held too long or moved too far to count as a tap.
    Released,
}

/// Tracks one pressed pointer until it is promoted or released.
#[derive(Debug, Clone, PartialEq)]
pub struct PressTracker {
    kind: PointerKind,
    origin: Point,
    started_ms: f64,
    promoted: Option<Promotion>,
}

impl PressTracker {
    pub fn new(kind: PointerKind, origin: Point, now_ms: f64) -> Self {
        Self {
            kind,
            origin,
            started_ms: now_ms,
            promoted: None,
        }
    }

    pub fn kind(&self) -> PointerKind {
        self.kind
    }

    pub fn promoted(&self) -> Option<Promotion> {
        self.promoted
    }

    fn displacement(&self, point: Point) -> f32 {
        (point.x - self.origin.x).hypot(point.y - self.origin.y)
    }

    fn held(&self, now_ms: f64, config: &InteractionConfig) -> bool {
        self.kind == PointerKind::Touch && now_ms - self.started_ms >= config.long_press_ms
    }

    fn moved(&self, point: Point, config: &InteractionConfig) -> bool {
        let threshold = match self.kind {
            PointerKind::Mouse => config.mouse_drag_threshold,
            PointerKind::Touch => config.tap_slop,
        };
        self.displacement(point) >= threshold
    }

    /// Timer check with no new position. Returns the promotion the first
    /// time the hold guard trips.
    pub fn tick(&mut self, now_ms: f64, config: &InteractionConfig) -> Option<Promotion> {
        if self.promoted.is_some() {
            return None;
        }
        if self.held(now_ms, config) {
            self.promoted = Some(Promotion::LongPress);
        }
        self.promoted
    }

    /// Pointer moved. Returns the promotion the first time either guard trips.
    pub fn update(&mut self, point: Point, now_ms: f64, config: &InteractionConfig) -> Option<Promotion> {
        if self.promoted.is_some() {
            return None;
        }
        if self.held(now_ms, config) {
            self.promoted = Some(Promotion::LongPress);
        } else if self.moved(point, config) {
            self.promoted = Some(Promotion::Movement);
        }
        self.promoted
    }

    /// Pointer lifted before promotion.
    pub fn release(&self, point: Point, now_ms: f64, config: &InteractionConfig) -> PressOutcome {
        let quick = now_ms - self.started_ms < config.long_press_ms;
        let still = self.displacement(point) < config.tap_slop;
        if self.promoted.is_none() && quick && still {
            PressOutcome::Tap
        } else {
            PressOutcome::Released
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> InteractionConfig {
        InteractionConfig::default()
    }

    #[test]
    fn test_touch_long_press_promotes_on_tick() {
        let mut press = PressTracker::new(PointerKind::Touch, Point::new(0.0, 0.0), 0.0);
        assert_eq!(press.tick(299.0, &config()), None);
        assert_eq!(press.tick(300.0, &config()), Some(Promotion::LongPress));
        // Only reported once.
        assert_eq!(press.tick(400.0, &config()), None);
    }

    #[test]
    fn test_touch_movement_promotes() {
        let mut press = PressTracker::new(PointerKind::Touch, Point::new(0.0, 0.0), 0.0);
        assert_eq!(press.update(Point::new(3.0, 4.0), 50.0, &config()), None);
        assert_eq!(press.update(Point::new(6.0, 8.0), 60.0, &config()), Some(Promotion::Movement));
    }

    #[test]
    fn test_hold_wins_when_both_guards_trip() {
        let mut press = PressTracker::new(PointerKind::Touch, Point::new(0.0, 0.0), 0.0);
        // The move arrives after the hold time without an intervening tick.
        assert_eq!(
            press.update(Point::new(50.0, 0.0), 350.0, &config()),
            Some(Promotion::LongPress)
        );
    }

    #[test]
    fn test_tap() {
        let press = PressTracker::new(PointerKind::Touch, Point::new(0.0, 0.0), 0.0);
        assert_eq!(press.release(Point::new(2.0, 2.0), 120.0, &config()), PressOutcome::Tap);
        assert_eq!(press.release(Point::new(2.0, 2.0), 300.0, &config()), PressOutcome::Released);
        assert_eq!(press.release(Point::new(10.0, 0.0), 10.0, &config()), PressOutcome::Released);
    }

    #[test]
    fn test_mouse_has_no_hold_guard() {
        let mut press = PressTracker::new(PointerKind::Mouse, Point::new(0.0, 0.0), 0.0);
        assert_eq!(press.tick(10_000.0, &config()), None);
        assert_eq!(press.update(Point::new(2.0, 0.0), 10_000.0, &config()), None);
        assert_eq!(press.update(Point::new(3.0, 0.0), 10_001.0, &config()), Some(Promotion::Movement));
    }
}
