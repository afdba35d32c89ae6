//! Org Chart - WASM Module
//!
//! Hierarchy layout and direct-manipulation engine for an organization
//! chart editor. Compiled to WebAssembly and exposed to the browser host via
//! wasm-bindgen; the host owns rendering, the network and the clock.
//!
//! # Architecture
//!
//! - `graph`: employee records, forest construction, filtering and the
//!   reporting-line directory (petgraph `StableGraph`)
//! - `layout`: leaf-count tree layout and elbow connectors
//! - `spatial`: R-tree card index for hit testing
//! - `viewport`: zoom, pan, pinch, wheel and animated center-fit
//! - `interaction`: press disambiguation and drag-to-reparent
//! - `mutation`, `history`: collaborator requests and bounded undo
//! - `app`: `OrgChart`, the state tying everything together

use js_sys::Float32Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod app;
pub mod config;
pub mod error;
pub mod graph;
pub mod history;
pub mod interaction;
pub mod layout;
pub mod mutation;
pub mod spatial;
pub mod viewport;

pub use app::{ChartEvent, Key, Notice, NoticeLevel, OrgChart, PointerButton};
pub use config::OrgChartConfig;
pub use error::{CollaboratorError, ConfigError, OrgChartError, Result, UndoError, ValidationError};

use graph::{Employee, EmployeeId, EmployeePatch, NewEmployee, TeamFilter};
use mutation::{Ack, Ticket};
use viewport::{FrameStatus, Point, WheelDeltaMode};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> std::result::Result<JsValue, JsError> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}

/// Pairs of `[x0, y0, x1, y1, ...]` from a flat touch buffer.
fn touch_points(flat: &[f32]) -> Vec<Point> {
    flat.chunks_exact(2).map(|p| Point::new(p[0], p[1])).collect()
}

/// Main entry point for the org chart engine.
///
/// Wraps [`OrgChart`] and converts between JS values and the core types.
/// Every method taking `now_ms` expects `performance.now()`.
#[wasm_bindgen]
pub struct OrgChartWasm {
    chart: OrgChart,
}

#[wasm_bindgen]
impl OrgChartWasm {
    /// Create a chart. `config` may be `undefined` or a partial config object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<OrgChartWasm, JsError> {
        let config: OrgChartConfig = if config.is_undefined() || config.is_null() {
            OrgChartConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            chart: OrgChart::new(config)?,
        })
    }

    // =========================================================================
    // Snapshot and filter
    // =========================================================================

    /// Replace the employee list. Returns true if a center-fit animation started.
    #[wasm_bindgen(js_name = setEmployees)]
    pub fn set_employees(&mut self, employees: JsValue, now_ms: f64) -> std::result::Result<bool, JsError> {
        let employees: Vec<Employee> = serde_wasm_bindgen::from_value(employees)?;
        Ok(self.chart.set_employees(employees, now_ms).is_some())
    }

    #[wasm_bindgen(js_name = employeeCount)]
    pub fn employee_count(&self) -> usize {
        self.chart.employees().len()
    }

    #[wasm_bindgen(js_name = setSearch)]
    pub fn set_search(&mut self, search: String, now_ms: f64) -> bool {
        self.chart.set_search(search, now_ms).is_some()
    }

    /// Select a team by name; `"all"` clears the team filter.
    #[wasm_bindgen(js_name = setTeam)]
    pub fn set_team(&mut self, selector: &str, now_ms: f64) -> bool {
        self.chart
            .set_team(TeamFilter::from_selector(selector), now_ms)
            .is_some()
    }

    pub fn teams(&self) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.teams())
    }

    // =========================================================================
    // Layout output
    // =========================================================================

    /// Card top-left corners as `[x0, y0, x1, y1, ...]`, in the same order
    /// as `positionIds`.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float32Array {
        let flat: Vec<f32> = self
            .chart
            .positions()
            .iter()
            .flat_map(|p| [p.x, p.y])
            .collect();
        Float32Array::from(&flat[..])
    }

    #[wasm_bindgen(js_name = positionIds)]
    pub fn position_ids(&self) -> Vec<String> {
        self.chart
            .positions()
            .iter()
            .map(|p| p.id.to_string())
            .collect()
    }

    /// Full position records including parent anchors and depth.
    #[wasm_bindgen(js_name = getPositionRecords)]
    pub fn get_position_records(&self) -> std::result::Result<JsValue, JsError> {
        to_js(self.chart.positions())
    }

    /// Connector polylines, 8 floats (4 points) per parent-child edge.
    #[wasm_bindgen(js_name = getConnectors)]
    pub fn get_connectors(&self) -> Float32Array {
        let flat: Vec<f32> = self
            .chart
            .connectors()
            .iter()
            .flat_map(|c| c.flat())
            .collect();
        Float32Array::from(&flat[..])
    }

    /// `[minX, minY, maxX, maxY]` of card origins, or empty when nothing is visible.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Float32Array {
        match self.chart.bounds() {
            Some(b) => Float32Array::from(&[b.min_x, b.min_y, b.max_x, b.max_y][..]),
            None => Float32Array::new_with_length(0),
        }
    }

    /// Card under a screen point.
    #[wasm_bindgen(js_name = hitTest)]
    pub fn hit_test(&self, x: f32, y: f32) -> Option<String> {
        let logical = self.chart.viewport().screen_to_logical(Point::new(x, y));
        self.chart
            .cards()
            .hit_test(logical.x, logical.y, self.chart.config().interaction.hit_slop)
            .map(ToString::to_string)
    }

    /// Ids of the cards on screen, for culling.
    #[wasm_bindgen(js_name = visibleCards)]
    pub fn visible_cards(&self) -> Vec<String> {
        self.chart
            .visible_cards()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    pub fn zoom(&self) -> f32 {
        self.chart.viewport_state().zoom
    }

    #[wasm_bindgen(js_name = panX)]
    pub fn pan_x(&self) -> f32 {
        self.chart.viewport_state().pan.x
    }

    #[wasm_bindgen(js_name = panY)]
    pub fn pan_y(&self) -> f32 {
        self.chart.viewport_state().pan.y
    }

    #[wasm_bindgen(js_name = setViewportSize)]
    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.chart.set_viewport_size(width, height);
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self, now_ms: f64) -> bool {
        self.chart.zoom_in(now_ms)
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self, now_ms: f64) -> bool {
        self.chart.zoom_out(now_ms)
    }

    #[wasm_bindgen(js_name = zoomBy)]
    pub fn zoom_by(&mut self, delta: f32, now_ms: f64) -> bool {
        self.chart.zoom_by(delta, now_ms)
    }

    #[wasm_bindgen(js_name = panBy)]
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.chart.pan_by(dx, dy);
    }

    #[wasm_bindgen(js_name = centerFit)]
    pub fn center_fit(&mut self, now_ms: f64) -> bool {
        self.chart.center_fit(now_ms).is_some()
    }

    /// Advance the running center-fit. Returns true while more frames are needed.
    #[wasm_bindgen(js_name = animationFrame)]
    pub fn animation_frame(&mut self, now_ms: f64) -> bool {
        self.chart.animation_frame(now_ms) == FrameStatus::Running
    }

    /// Wheel zoom about the cursor. `delta_mode` is `WheelEvent.deltaMode`.
    pub fn wheel(&mut self, delta_y: f32, delta_mode: u32, x: f32, y: f32, now_ms: f64) -> bool {
        self.chart.wheel(
            delta_y,
            WheelDeltaMode::from_dom(delta_mode),
            Point::new(x, y),
            now_ms,
        )
    }

    // =========================================================================
    // Pointer, touch and keyboard input
    // =========================================================================

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32, button: i16, now_ms: f64) {
        self.chart
            .pointer_down(Point::new(x, y), PointerButton::from_dom(button), now_ms);
    }

    /// Returns the drag session (or `undefined` when not dragging).
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32, now_ms: f64) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.pointer_move(Point::new(x, y), now_ms))
    }

    /// Returns a `ChartEvent` (tap or mutation request) or `undefined`.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32, now_ms: f64) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.pointer_up(Point::new(x, y), now_ms))
    }

    /// `touches` is `[x0, y0, x1, y1, ...]` for the fingers now down.
    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, touches: &[f32], now_ms: f64) {
        self.chart.touch_start(&touch_points(touches), now_ms);
    }

    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self, touches: &[f32], now_ms: f64) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.touch_move(&touch_points(touches), now_ms))
    }

    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self, x: f32, y: f32, remaining: usize, now_ms: f64) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.touch_end(Point::new(x, y), remaining, now_ms))
    }

    /// Long-press timer. Returns the drag session if the press was promoted.
    pub fn tick(&mut self, now_ms: f64) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.tick(now_ms))
    }

    /// `code` is `KeyboardEvent.code`.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, code: &str) {
        self.chart.key_down(Key::from_code(code));
    }

    #[wasm_bindgen(js_name = keyUp)]
    pub fn key_up(&mut self, code: &str) {
        self.chart.key_up(Key::from_code(code));
    }

    #[wasm_bindgen(js_name = setHandTool)]
    pub fn set_hand_tool(&mut self, enabled: bool) {
        self.chart.set_hand_tool(enabled);
    }

    #[wasm_bindgen(js_name = handTool)]
    pub fn hand_tool(&self) -> bool {
        self.chart.hand_tool()
    }

    // =========================================================================
    // Host-driven drag
    // =========================================================================

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, id: &str) -> bool {
        self.chart.begin_drag(&EmployeeId::from(id))
    }

    #[wasm_bindgen(js_name = updateHover)]
    pub fn update_hover(&mut self, x: f32, y: f32) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.update_hover(Point::new(x, y)))
    }

    /// Returns the mutation request for a valid drop, else `undefined`.
    pub fn drop(&mut self) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.drop())
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) -> bool {
        self.chart.cancel_drag()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    #[wasm_bindgen(js_name = requestCreate)]
    pub fn request_create(&mut self, fields: JsValue) -> std::result::Result<JsValue, JsError> {
        let fields: NewEmployee = serde_wasm_bindgen::from_value(fields)?;
        to_js(&self.chart.request_create(fields))
    }

    #[wasm_bindgen(js_name = requestUpdate)]
    pub fn request_update(&mut self, id: &str, patch: JsValue) -> std::result::Result<JsValue, JsError> {
        let patch: EmployeePatch = serde_wasm_bindgen::from_value(patch)?;
        to_js(&self.chart.request_update(&EmployeeId::from(id), patch)?)
    }

    #[wasm_bindgen(js_name = requestDelete)]
    pub fn request_delete(&mut self, id: &str) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.request_delete(&EmployeeId::from(id))?)
    }

    #[wasm_bindgen(js_name = requestMove)]
    pub fn request_move(&mut self, id: &str, new_manager: &str) -> std::result::Result<JsValue, JsError> {
        let request = self
            .chart
            .request_move(&EmployeeId::from(id), &EmployeeId::from(new_manager))?;
        to_js(&request)
    }

    #[wasm_bindgen(js_name = undoLast)]
    pub fn undo_last(&mut self) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.undo_last()?)
    }

    /// Report a successful collaborator response. Returns true if a
    /// center-fit animation started.
    #[wasm_bindgen(js_name = completeOk)]
    pub fn complete_ok(&mut self, ticket: u32, ack: JsValue, now_ms: f64) -> std::result::Result<bool, JsError> {
        let ack: Ack = serde_wasm_bindgen::from_value(ack)?;
        let handle = self
            .chart
            .complete(Ticket(u64::from(ticket)), Ok(ack), now_ms)?;
        Ok(handle.is_some())
    }

    /// Report a failed collaborator call. State is left untouched and an
    /// error notice is queued.
    #[wasm_bindgen(js_name = completeErr)]
    pub fn complete_err(&mut self, ticket: u32, message: String, now_ms: f64) -> std::result::Result<(), JsError> {
        let result = self.chart.complete(
            Ticket(u64::from(ticket)),
            Err(CollaboratorError::Network { message }),
            now_ms,
        );
        match result {
            Err(OrgChartError::UnknownTicket { ticket }) => {
                Err(JsError::new(&format!("no pending mutation for ticket {ticket}")))
            }
            _ => Ok(()),
        }
    }

    #[wasm_bindgen(js_name = historyLength)]
    pub fn history_length(&self) -> usize {
        self.chart.history().len()
    }

    /// Notices queued since the last call, as `{ level, message }` objects.
    #[wasm_bindgen(js_name = drainNotices)]
    pub fn drain_notices(&mut self) -> std::result::Result<JsValue, JsError> {
        to_js(&self.chart.drain_notices())
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::graph::forest_len;
    use crate::layout::LayoutConfig;
    use crate::mutation::InMemoryRepository;

    /// Balanced tree with `fanout` reports per manager, ids numbered from 1.
    fn company(size: usize, fanout: usize) -> Vec<Employee> {
        (1..=size)
            .map(|i| {
                let manager = (i > 1).then(|| EmployeeId::from(((i - 2) / fanout + 1).to_string()));
                Employee::new(i.to_string(), format!("Employee {i}"), manager)
                    .with_team(["Design", "Engineering", "Sales"][i % 3])
            })
            .collect()
    }

    #[test]
    fn test_large_company_pipeline() {
        let employees = company(500, 4);
        let mut chart = OrgChart::default();
        chart.set_employees(employees, 0.0);

        assert_eq!(forest_len(chart.forest()), 500);
        assert_eq!(chart.positions().len(), 500);
        assert_eq!(chart.connectors().len(), 499);
        assert_eq!(chart.cards().len(), 500);

        // No two cards overlap on the same level.
        let config = LayoutConfig::default();
        let mut by_level: std::collections::BTreeMap<u32, Vec<f32>> = Default::default();
        for p in chart.positions() {
            assert_eq!(p.y, p.depth as f32 * config.level_height);
            by_level.entry(p.depth).or_default().push(p.x);
        }
        for xs in by_level.values_mut() {
            xs.sort_by(f32::total_cmp);
            for pair in xs.windows(2) {
                assert!(pair[1] - pair[0] >= config.card_width);
            }
        }

        // Fit lands inside the zoom range once the tween finishes.
        chart.animation_frame(10_000.0);
        let state = chart.viewport_state();
        assert!((0.5..=1.0).contains(&state.zoom));
    }

    #[test]
    fn test_filter_then_reparent_across_teams() {
        let mut chart = OrgChart::default();
        let mut repo = InMemoryRepository::new(company(40, 3));
        chart.load(&repo, 0.0).unwrap();

        chart.set_team(TeamFilter::Team("Sales".into()), 0.0);
        assert!(chart.positions().iter().all(|p| {
            chart.employee(&p.id).is_some_and(|e| e.team == "Sales")
        }));

        // Reparenting onto someone outside the visible team still validates
        // against the full directory.
        let request = chart.request_move(&"40".into(), &"2".into()).unwrap();
        chart.run(&mut repo, &request, 10.0).unwrap();
        assert_eq!(
            chart.employee(&"40".into()).unwrap().manager_id,
            Some("2".into())
        );
        assert_eq!(repo.employees().len(), 40);
    }

    #[test]
    fn test_history_capacity_evicts_oldest() {
        let config = OrgChartConfig {
            history_capacity: 3,
            ..Default::default()
        };
        let mut chart = OrgChart::new(config).unwrap();
        let mut repo = InMemoryRepository::new(company(10, 3));
        chart.load(&repo, 0.0).unwrap();

        for (i, name) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            let request = chart.request_create(NewEmployee {
                name: (*name).into(),
                manager_id: Some("1".into()),
                ..Default::default()
            });
            chart.run(&mut repo, &request, i as f64).unwrap();
        }
        assert_eq!(chart.employees().len(), 15);
        assert_eq!(chart.history().len(), 3);

        for _ in 0..3 {
            let undo = chart.undo_last().unwrap();
            chart.run(&mut repo, &undo, 100.0).unwrap();
        }
        // A and B fell off the history.
        assert_eq!(chart.employees().len(), 12);
        assert!(chart.undo_last().is_err());
    }

    #[test]
    fn test_config_validation_rejects() {
        let config = OrgChartConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            OrgChart::new(config),
            Err(OrgChartError::Config(ConfigError::ZeroHistory))
        ));
    }
}
