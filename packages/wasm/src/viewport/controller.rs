//! ViewportController - zoom, pan and center-fit over logical coordinates.
//!
//! The controller owns the only mutable copy of the viewport state. Every
//! write goes through it so the running tween can be invalidated whenever
//! something else takes over the viewport.

use serde::{Deserialize, Serialize};

use super::gesture::{PanGesture, PinchGesture, WheelDeltaMode, ZoomGate, midpoint, touch_distance};
use super::tween::{AnimationHandle, FrameStatus, Tween};
use super::{Point, ViewportState};
use crate::layout::{Bounds, LayoutConfig};

/// Configuration for zoom limits, fitting and input scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewportConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom change per zoom-in/zoom-out button press.
    pub zoom_step: f32,
    /// Discrete zoom requests inside this window after an applied one are dropped.
    pub zoom_coalesce_ms: f64,
    /// Center-fit never zooms in past this.
    pub fit_max_zoom: f32,
    /// Extra logical space added around the chart when fitting.
    pub fit_margin: f32,
    pub fit_duration_ms: f64,
    /// Viewport widths at or above this are treated as desktop.
    pub desktop_breakpoint: f32,
    /// Fit scale multiplier on desktop widths.
    pub desktop_fit_factor: f32,
    /// Screen offset applied after fitting the whole forest.
    pub full_view_bias: Point,
    /// Screen offset applied after fitting a single-team view.
    pub filtered_view_bias: Point,
    pub wheel_pixel_divisor: f32,
    pub wheel_line_divisor: f32,
    /// Initial viewport size until the host reports the real one.
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 2.5,
            zoom_step: 0.1,
            zoom_coalesce_ms: 120.0,
            fit_max_zoom: 1.0,
            fit_margin: 80.0,
            fit_duration_ms: 350.0,
            desktop_breakpoint: 768.0,
            desktop_fit_factor: 0.9,
            full_view_bias: Point::new(220.0, -200.0),
            filtered_view_bias: Point::new(90.0, 0.0),
            wheel_pixel_divisor: 500.0,
            wheel_line_divisor: 50.0,
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Zoom/pan controller with gesture snapshots and generation-counted tweens.
pub struct ViewportController {
    config: ViewportConfig,
    state: ViewportState,
    size: Point,
    gate: ZoomGate,
    pan_gesture: Option<PanGesture>,
    pinch: Option<PinchGesture>,
    tween: Option<Tween>,
    generation: u64,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        let size = Point::new(config.width, config.height);
        Self {
            config,
            state: ViewportState::default(),
            size,
            gate: ZoomGate::new(),
            pan_gesture: None,
            pinch: None,
            tween: None,
            generation: 0,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> f32 {
        self.state.zoom
    }

    pub fn pan(&self) -> Point {
        self.state.pan
    }

    pub fn size(&self) -> Point {
        self.size
    }

    /// Record the host viewport size in screen pixels.
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.size = Point::new(width.max(0.0), height.max(0.0));
    }

    pub fn is_panning(&self) -> bool {
        self.pan_gesture.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    #[inline]
    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.max(self.config.min_zoom).min(self.config.max_zoom)
    }

    /// Round to three decimals, then clamp.
    #[inline]
    fn quantize_zoom(&self, zoom: f32) -> f32 {
        self.clamp_zoom((zoom * 1000.0).round() / 1000.0)
    }

    fn invalidate_animation(&mut self) {
        if let Some(tween) = self.tween.take() {
            tracing::debug!(generation = tween.generation, "viewport tween superseded by direct write");
        }
    }

    /// Reset to `zoom = 1, pan = (0, 0)` and drop any gesture or tween.
    pub fn reset(&mut self) {
        self.invalidate_animation();
        self.pan_gesture = None;
        self.pinch = None;
        self.state = ViewportState::default();
    }

    // =========================================================================
    // Zoom
    // =========================================================================

    /// Discrete zoom step. Returns false if the request fell inside the
    /// coalescing window and was dropped.
    pub fn zoom_by(&mut self, delta: f32, now_ms: f64) -> bool {
        if !self.gate.admit(now_ms, self.config.zoom_coalesce_ms) {
            tracing::trace!(delta, "zoom request coalesced");
            return false;
        }
        self.invalidate_animation();
        self.state.zoom = self.quantize_zoom(self.state.zoom + delta);
        true
    }

    pub fn zoom_in(&mut self, now_ms: f64) -> bool {
        self.zoom_by(self.config.zoom_step, now_ms)
    }

    pub fn zoom_out(&mut self, now_ms: f64) -> bool {
        self.zoom_by(-self.config.zoom_step, now_ms)
    }

    /// Zoom to `new_zoom` while keeping the screen point `focal` fixed over
    /// the same logical point.
    pub fn zoom_to_point(&mut self, focal: Point, new_zoom: f32) {
        self.invalidate_animation();
        let new_zoom = self.clamp_zoom(new_zoom);
        let ratio = new_zoom / self.state.zoom;
        let pan = self.state.pan;
        self.state = ViewportState {
            zoom: new_zoom,
            pan: Point::new(
                focal.x - (focal.x - pan.x) * ratio,
                focal.y - (focal.y - pan.y) * ratio,
            ),
        };
    }

    /// Wheel zoom around the cursor, sharing the discrete zoom gate.
    pub fn wheel(&mut self, delta_y: f32, mode: WheelDeltaMode, focal: Point, now_ms: f64) -> bool {
        if !self.gate.admit(now_ms, self.config.zoom_coalesce_ms) {
            return false;
        }
        let delta = mode.zoom_delta(
            delta_y,
            self.config.wheel_pixel_divisor,
            self.config.wheel_line_divisor,
        );
        let target = self.quantize_zoom(self.state.zoom + delta);
        self.zoom_to_point(focal, target);
        true
    }

    // =========================================================================
    // Pan
    // =========================================================================

    /// Start a pan gesture at a screen point.
    pub fn begin_pan(&mut self, pointer: Point) {
        self.invalidate_animation();
        self.pan_gesture = Some(PanGesture::new(pointer, self.state.pan));
    }

    /// Move the active pan gesture's pointer. Ignored without a gesture.
    pub fn pan_to(&mut self, pointer: Point) {
        if let Some(gesture) = self.pan_gesture {
            self.invalidate_animation();
            self.state.pan = gesture.pan_at(pointer);
        }
    }

    /// Pan by a total displacement since the gesture started.
    ///
    /// Without an active gesture this is a one-shot offset from the
    /// current pan.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let gesture = self
            .pan_gesture
            .unwrap_or_else(|| PanGesture::new(Point::default(), self.state.pan));
        self.invalidate_animation();
        self.state.pan = gesture.pan_by(dx, dy);
    }

    pub fn end_pan(&mut self) {
        self.pan_gesture = None;
    }

    // =========================================================================
    // Pinch
    // =========================================================================

    /// Two fingers down. Ends any single-finger pan.
    pub fn begin_pinch(&mut self, a: Point, b: Point) {
        self.invalidate_animation();
        self.pan_gesture = None;
        self.pinch = Some(PinchGesture::new(touch_distance(a, b), self.state.zoom));
    }

    /// Fingers moved. Zooms about their midpoint.
    pub fn update_pinch(&mut self, a: Point, b: Point) {
        let Some(pinch) = self.pinch else {
            return;
        };
        let distance = touch_distance(a, b);
        if let Some(zoom) = pinch.zoom_for(distance, self.config.min_zoom, self.config.max_zoom) {
            self.zoom_to_point(midpoint(a, b), zoom);
        }
    }

    pub fn end_pinch(&mut self) {
        self.pinch = None;
    }

    // =========================================================================
    // Center-fit and animation
    // =========================================================================

    /// Target state framing `bounds` inside the current viewport size.
    pub fn fit_target(&self, bounds: &Bounds, layout: &LayoutConfig, filtered: bool) -> ViewportState {
        let c = &self.config;
        let chart_width = bounds.chart_width(layout);
        let chart_height = bounds.chart_height(layout);

        let zoom_x = self.size.x / (chart_width + c.fit_margin);
        let zoom_y = self.size.y / (chart_height + c.fit_margin);
        let mut zoom = zoom_x.min(zoom_y).max(c.min_zoom).min(c.fit_max_zoom);

        let bias = if filtered {
            c.filtered_view_bias
        } else {
            c.full_view_bias
        };
        let mut bias_y = bias.y;
        if self.size.x >= c.desktop_breakpoint {
            zoom *= c.desktop_fit_factor;
        } else {
            bias_y = 0.0;
        }
        // The desktop factor may push below the floor; the state range wins.
        zoom = zoom.min(c.fit_max_zoom).max(c.min_zoom);

        ViewportState {
            zoom,
            pan: Point::new(
                self.size.x / 2.0 - (bounds.min_x + chart_width / 2.0) * zoom + bias.x,
                bias_y - bounds.min_y * zoom,
            ),
        }
    }

    /// Animate toward a framing of `bounds`. With no bounds (empty chart)
    /// the viewport resets immediately and no animation starts.
    pub fn center_fit(
        &mut self,
        bounds: Option<&Bounds>,
        layout: &LayoutConfig,
        filtered: bool,
        now_ms: f64,
    ) -> Option<AnimationHandle> {
        let Some(bounds) = bounds else {
            self.reset();
            return None;
        };
        let target = self.fit_target(bounds, layout, filtered);
        tracing::debug!(
            zoom = target.zoom,
            pan_x = target.pan.x,
            pan_y = target.pan.y,
            filtered,
            "center fit"
        );
        Some(self.animate_to(target, now_ms))
    }

    /// Start a tween from the current state. Supersedes any running tween.
    pub fn animate_to(&mut self, target: ViewportState, now_ms: f64) -> AnimationHandle {
        self.generation += 1;
        self.tween = Some(Tween {
            generation: self.generation,
            from: self.state,
            to: target,
            start_ms: now_ms,
            duration_ms: self.config.fit_duration_ms,
        });
        AnimationHandle {
            generation: self.generation,
        }
    }

    /// Per-frame callback. Frames from a superseded animation write nothing.
    pub fn on_animation_frame(&mut self, handle: AnimationHandle, now_ms: f64) -> FrameStatus {
        let Some(tween) = &self.tween else {
            return FrameStatus::Stale;
        };
        if tween.generation != handle.generation {
            return FrameStatus::Stale;
        }
        let (state, done) = tween.sample(now_ms);
        self.state = state;
        if done {
            self.tween = None;
            FrameStatus::Finished
        } else {
            FrameStatus::Running
        }
    }

    // =========================================================================
    // Coordinate mapping
    // =========================================================================

    pub fn screen_to_logical(&self, screen: Point) -> Point {
        self.state.screen_to_logical(screen)
    }

    pub fn logical_to_screen(&self, logical: Point) -> Point {
        self.state.logical_to_screen(logical)
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}
