//! OrgChart - the application state for one mounted chart.
//!
//! Owns the employee snapshot, the active filter, the derived forest and
//! layout, the card index, the viewport, the drag controller, the undo
//! history and the in-flight mutations. Hosts hold one `OrgChart` and
//! drive it with input events, timestamps and collaborator responses.
//!
//! Data flow on every snapshot or filter change:
//!
//! ```text
//! employees ─▶ filter ─▶ build_forest ─▶ OrgTreeLayout ─▶ positions ─▶ CardIndex
//!     └──────────────▶ OrgDirectory (full list, used for drop validation)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::OrgChartConfig;
use crate::error::{CollaboratorError, OrgChartError, Result, UndoError, ValidationError};
use crate::graph::{
    Employee, EmployeeFilter, EmployeeId, EmployeePatch, NewEmployee, OrgDirectory, TeamFilter,
    TreeNode, build_forest, teams,
};
use crate::history::{ActionHistory, HistoryEntry, HistoryKind};
use crate::interaction::{
    DragDropController, DragSession, DropOutcome, PointerKind, ReleaseOutcome, validate_drop,
};
use crate::layout::{Bounds, Connector, OrgTreeLayout, Position, connectors};
use crate::mutation::{Ack, EmployeeRepository, Mutation, MutationRequest, Ticket};
use crate::spatial::CardIndex;
use crate::viewport::{
    AnimationHandle, FrameStatus, Point, ViewportController, ViewportState, WheelDeltaMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-facing message for the host to show (a toast, typically).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map DOM `MouseEvent.button`.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Middle,
            _ => Self::Secondary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    Space,
    Escape,
    Other,
}

impl Key {
    /// Map DOM `KeyboardEvent.code`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "Space" => Self::Space,
            "Escape" => Self::Escape,
            _ => Self::Other,
        }
    }
}

/// Something the host must act on after an input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ChartEvent {
    /// Short touch on a card (opens the card's action menu).
    Tap { id: EmployeeId },
    /// A valid drop produced a mutation to send to the collaborator.
    Request { request: MutationRequest },
}

#[derive(Debug, Clone)]
enum Origin {
    User,
    Undo(HistoryEntry),
}

#[derive(Debug, Clone)]
struct Pending {
    mutation: Mutation,
    origin: Origin,
    /// Record of the target as it was when the request was issued.
    before: Option<Employee>,
}

/// The chart's application state.
pub struct OrgChart {
    config: OrgChartConfig,
    layout: OrgTreeLayout,
    employees: Vec<Employee>,
    directory: OrgDirectory,
    filter: EmployeeFilter,
    forest: Vec<TreeNode>,
    positions: Vec<Position>,
    cards: CardIndex,
    viewport: ViewportController,
    drag: DragDropController,
    history: ActionHistory,
    pending: BTreeMap<Ticket, Pending>,
    next_ticket: u64,
    space_held: bool,
    notices: Vec<Notice>,
    animation: Option<AnimationHandle>,
    /// Filter and visible ids of the last center-fit.
    fitted: Option<(EmployeeFilter, Vec<EmployeeId>)>,
}

impl OrgChart {
    pub fn new(config: OrgChartConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            layout: OrgTreeLayout::new(config.layout.clone()),
            viewport: ViewportController::new(config.viewport.clone()),
            drag: DragDropController::new(config.interaction.clone()),
            history: ActionHistory::new(config.history_capacity),
            config,
            employees: Vec::new(),
            directory: OrgDirectory::new(),
            filter: EmployeeFilter::default(),
            forest: Vec::new(),
            positions: Vec::new(),
            cards: CardIndex::new(),
            pending: BTreeMap::new(),
            next_ticket: 1,
            space_held: false,
            notices: Vec::new(),
            animation: None,
            fitted: None,
        })
    }

    pub fn config(&self) -> &OrgChartConfig {
        &self.config
    }

    // =========================================================================
    // Snapshot and derived state
    // =========================================================================

    /// Replace the employee snapshot wholesale.
    pub fn set_employees(&mut self, employees: Vec<Employee>, now_ms: f64) -> Option<AnimationHandle> {
        self.employees = employees;
        self.directory.rebuild(&self.employees);
        self.refresh(now_ms)
    }

    /// Fetch the snapshot from a repository.
    pub fn load(&mut self, repo: &impl EmployeeRepository, now_ms: f64) -> Result<Option<AnimationHandle>> {
        match repo.list_employees() {
            Ok(employees) => Ok(self.set_employees(employees, now_ms)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch employees");
                self.notices.push(Notice::error("Failed to fetch employees"));
                Err(err.into())
            }
        }
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == *id)
    }

    pub fn directory(&self) -> &OrgDirectory {
        &self.directory
    }

    pub fn forest(&self) -> &[TreeNode] {
        &self.forest
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn cards(&self) -> &CardIndex {
        &self.cards
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of(&self.positions)
    }

    pub fn connectors(&self) -> Vec<Connector> {
        connectors(&self.positions, &self.config.layout)
    }

    /// Sorted team names over the full snapshot.
    pub fn teams(&self) -> Vec<String> {
        teams(&self.employees)
    }

    pub fn filter(&self) -> &EmployeeFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: EmployeeFilter, now_ms: f64) -> Option<AnimationHandle> {
        self.filter = filter;
        self.refresh(now_ms)
    }

    pub fn set_search(&mut self, search: impl Into<String>, now_ms: f64) -> Option<AnimationHandle> {
        self.filter.search = search.into();
        self.refresh(now_ms)
    }

    pub fn set_team(&mut self, team: TeamFilter, now_ms: f64) -> Option<AnimationHandle> {
        self.filter.team = team;
        self.refresh(now_ms)
    }

    /// Rebuild forest, layout and card index. Re-fits the viewport when the
    /// filter or the set of visible employees changed.
    fn refresh(&mut self, now_ms: f64) -> Option<AnimationHandle> {
        let visible = self.filter.apply(&self.employees);
        self.forest = build_forest(&visible);
        self.positions = self.layout.compute(&mut self.forest);
        self.cards.rebuild(&self.positions, &self.config.layout);

        let orphaned = self
            .drag
            .session()
            .is_some_and(|session| !self.directory.contains(&session.dragged_id));
        if orphaned {
            self.drag.cancel_drag();
        }

        let mut ids: Vec<EmployeeId> = self.positions.iter().map(|p| p.id.clone()).collect();
        ids.sort_unstable();
        let key = (self.filter.clone(), ids);
        if self.fitted.as_ref() == Some(&key) {
            return None;
        }
        self.fitted = Some(key);
        self.center_fit(now_ms)
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport.set_viewport_size(width, height);
    }

    pub fn zoom_by(&mut self, delta: f32, now_ms: f64) -> bool {
        self.viewport.zoom_by(delta, now_ms)
    }

    pub fn zoom_in(&mut self, now_ms: f64) -> bool {
        self.viewport.zoom_in(now_ms)
    }

    pub fn zoom_out(&mut self, now_ms: f64) -> bool {
        self.viewport.zoom_out(now_ms)
    }

    /// Pan by a total displacement since the active pan gesture started.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.viewport.pan_by(dx, dy);
    }

    /// Frame the visible chart. Resets the viewport when nothing is visible.
    pub fn center_fit(&mut self, now_ms: f64) -> Option<AnimationHandle> {
        let bounds = self.bounds();
        let filtered = self.filter.is_team_view();
        self.animation =
            self.viewport
                .center_fit(bounds.as_ref(), &self.config.layout, filtered, now_ms);
        self.animation
    }

    /// Ids of the cards intersecting the visible screen area.
    pub fn visible_cards(&self) -> Vec<EmployeeId> {
        let top_left = self.viewport.screen_to_logical(Point::default());
        let bottom_right = self.viewport.screen_to_logical(self.viewport.size());
        self.cards
            .in_rect(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }

    /// The animation most recently started by this chart.
    pub fn animation(&self) -> Option<AnimationHandle> {
        self.animation
    }

    /// Advance the most recent animation.
    pub fn animation_frame(&mut self, now_ms: f64) -> FrameStatus {
        let Some(handle) = self.animation else {
            return FrameStatus::Stale;
        };
        let status = self.viewport.on_animation_frame(handle, now_ms);
        if status != FrameStatus::Running {
            self.animation = None;
        }
        status
    }

    /// Advance a specific animation; frames of superseded ones are ignored.
    pub fn on_animation_frame(&mut self, handle: AnimationHandle, now_ms: f64) -> FrameStatus {
        self.viewport.on_animation_frame(handle, now_ms)
    }

    pub fn wheel(&mut self, delta_y: f32, mode: WheelDeltaMode, screen: Point, now_ms: f64) -> bool {
        if self.drag.hand_tool() {
            return false;
        }
        self.viewport.wheel(delta_y, mode, screen, now_ms)
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn hand_tool(&self) -> bool {
        self.drag.hand_tool()
    }

    pub fn set_hand_tool(&mut self, enabled: bool) {
        self.drag.set_hand_tool(enabled);
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.session()
    }

    fn card_at(&self, screen: Point) -> Option<EmployeeId> {
        let logical = self.viewport.screen_to_logical(screen);
        self.cards
            .hit_test(logical.x, logical.y, self.config.interaction.hit_slop)
            .cloned()
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Space => self.space_held = true,
            Key::Escape => {
                self.drag.cancel_drag();
            }
            Key::Other => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if key == Key::Space {
            self.space_held = false;
        }
    }

    /// Mouse button down. Pans with the hand tool, with Space held, or with
    /// the middle button; otherwise a primary press on a card arms a drag.
    /// Ignored while a pan, press or drag already holds the pointer.
    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, now_ms: f64) {
        if self.pointer_captured() {
            return;
        }
        let primary = button == PointerButton::Primary;
        if (primary && (self.drag.hand_tool() || self.space_held)) || button == PointerButton::Middle {
            self.viewport.begin_pan(screen);
            return;
        }
        if !primary {
            return;
        }
        if let Some(id) = self.card_at(screen) {
            self.drag
                .press(&id, PointerKind::Mouse, screen, now_ms, &self.directory);
        }
    }

    pub fn pointer_move(&mut self, screen: Point, now_ms: f64) -> Option<&DragSession> {
        if self.viewport.is_panning() {
            self.viewport.pan_to(screen);
            return None;
        }
        let logical = self.viewport.screen_to_logical(screen);
        self.drag
            .pointer_move(screen, logical, now_ms, &self.cards, &self.directory)
    }

    pub fn pointer_up(&mut self, screen: Point, now_ms: f64) -> Option<ChartEvent> {
        if self.viewport.is_panning() {
            self.viewport.end_pan();
            return None;
        }
        self.release(screen, now_ms)
    }

    /// Touch points changed to `touches` (one or two fingers down).
    pub fn touch_start(&mut self, touches: &[Point], now_ms: f64) {
        match touches {
            [a, b, ..] => {
                self.drag.cancel_drag();
                self.viewport.begin_pinch(*a, *b);
            }
            [_] if self.pointer_captured() => {}
            [point] => {
                if self.drag.hand_tool() {
                    self.viewport.begin_pan(*point);
                } else if let Some(id) = self.card_at(*point) {
                    self.drag
                        .press(&id, PointerKind::Touch, *point, now_ms, &self.directory);
                }
            }
            [] => {}
        }
    }

    pub fn touch_move(&mut self, touches: &[Point], now_ms: f64) -> Option<&DragSession> {
        match touches {
            [a, b, ..] if self.viewport.is_pinching() => {
                self.viewport.update_pinch(*a, *b);
                None
            }
            [point] => self.pointer_move(*point, now_ms),
            _ => None,
        }
    }

    /// A finger lifted at `lifted`; `remaining` are still down.
    pub fn touch_end(&mut self, lifted: Point, remaining: usize, now_ms: f64) -> Option<ChartEvent> {
        if self.viewport.is_pinching() {
            if remaining < 2 {
                self.viewport.end_pinch();
            }
            return None;
        }
        self.pointer_up(lifted, now_ms)
    }

    fn pointer_captured(&self) -> bool {
        self.viewport.is_panning() || self.drag.is_armed() || self.drag.is_dragging()
    }

    /// Timer callback while a touch press is armed.
    pub fn tick(&mut self, now_ms: f64) -> Option<&DragSession> {
        self.drag.tick(now_ms, &self.directory)
    }

    fn release(&mut self, screen: Point, now_ms: f64) -> Option<ChartEvent> {
        let logical = self.viewport.screen_to_logical(screen);
        match self
            .drag
            .release(screen, logical, now_ms, &self.cards, &self.directory)
        {
            ReleaseOutcome::None => None,
            ReleaseOutcome::Tap(id) => Some(ChartEvent::Tap { id }),
            ReleaseOutcome::Dropped(outcome) => self
                .settle_drop(outcome)
                .map(|request| ChartEvent::Request { request }),
        }
    }

    // =========================================================================
    // Drag and drop (host-driven)
    // =========================================================================

    pub fn begin_drag(&mut self, id: &EmployeeId) -> bool {
        self.drag.begin_drag(id, &self.directory)
    }

    /// Hover at a screen point during a drag.
    pub fn update_hover(&mut self, screen: Point) -> Option<&DragSession> {
        let logical = self.viewport.screen_to_logical(screen);
        self.drag.update_hover(logical, &self.cards, &self.directory)
    }

    /// Drop on the hovered card. A valid drop yields the reparent request.
    pub fn drop(&mut self) -> Option<MutationRequest> {
        let outcome = self.drag.drop(&self.directory);
        self.settle_drop(outcome)
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.drag.cancel_drag()
    }

    fn settle_drop(&mut self, outcome: DropOutcome) -> Option<MutationRequest> {
        match outcome {
            DropOutcome::Reparent {
                employee,
                new_manager,
            } => Some(self.issue(
                Mutation::Update {
                    id: employee,
                    patch: EmployeePatch::reparent(Some(new_manager)),
                },
                Origin::User,
            )),
            DropOutcome::Rejected(err) => {
                self.notices.push(Notice::error(err.to_string()));
                None
            }
            DropOutcome::NoTarget | DropOutcome::Cancelled => None,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    fn issue(&mut self, mutation: Mutation, origin: Origin) -> MutationRequest {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;

        let target = mutation.target();
        if let Some(id) = target {
            let overlapping = self
                .pending
                .values()
                .any(|p| p.mutation.target() == Some(id));
            if overlapping {
                tracing::warn!(id = %id, %ticket, "mutation issued while another is in flight");
            }
        }
        let before = target.and_then(|id| self.employee(id)).cloned();

        tracing::debug!(%ticket, verb = mutation.verb(), "mutation issued");
        self.pending.insert(
            ticket,
            Pending {
                mutation: mutation.clone(),
                origin,
                before,
            },
        );
        MutationRequest { ticket, mutation }
    }

    fn require(&self, id: &EmployeeId) -> Result<()> {
        if self.directory.contains(id) {
            Ok(())
        } else {
            Err(ValidationError::UnknownEmployee { id: id.clone() }.into())
        }
    }

    pub fn request_create(&mut self, fields: NewEmployee) -> MutationRequest {
        self.issue(Mutation::Create { fields }, Origin::User)
    }

    pub fn request_update(&mut self, id: &EmployeeId, patch: EmployeePatch) -> Result<MutationRequest> {
        self.require(id)?;
        Ok(self.issue(
            Mutation::Update {
                id: id.clone(),
                patch,
            },
            Origin::User,
        ))
    }

    pub fn request_delete(&mut self, id: &EmployeeId) -> Result<MutationRequest> {
        self.require(id)?;
        Ok(self.issue(Mutation::Delete { id: id.clone() }, Origin::User))
    }

    /// Reparent through the same validation as a drop.
    pub fn request_move(&mut self, id: &EmployeeId, new_manager: &EmployeeId) -> Result<MutationRequest> {
        if let Err(err) = validate_drop(&self.directory, id, new_manager) {
            self.notices.push(Notice::error(err.to_string()));
            return Err(err.into());
        }
        Ok(self.issue(
            Mutation::Update {
                id: id.clone(),
                patch: EmployeePatch::reparent(Some(new_manager.clone())),
            },
            Origin::User,
        ))
    }

    /// Pop the newest history entry and issue its inverse.
    pub fn undo_last(&mut self) -> Result<MutationRequest> {
        let entry = match self.history.pop() {
            Ok(entry) => entry,
            Err(err) => {
                self.notices.push(Notice::error("No actions to undo"));
                return Err(err.into());
            }
        };
        let Some(inverse) = entry.inverse() else {
            return Err(UndoError::MissingSnapshot {
                id: entry.employee_id,
            }
            .into());
        };
        tracing::info!(id = %entry.employee_id, kind = ?entry.kind, "undo issued");
        Ok(self.issue(inverse, Origin::Undo(entry)))
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Apply the collaborator's answer for `ticket`.
    ///
    /// Only a successful answer touches the snapshot and the history. A
    /// failed undo puts its history entry back at its original position.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<Ack, CollaboratorError>,
        now_ms: f64,
    ) -> Result<Option<AnimationHandle>> {
        let pending = self
            .pending
            .remove(&ticket)
            .ok_or(OrgChartError::UnknownTicket { ticket })?;

        let ack = match result {
            Ok(ack) => ack,
            Err(err) => {
                tracing::warn!(%ticket, error = %err, verb = pending.mutation.verb(), "mutation failed");
                let message = match &pending.origin {
                    Origin::Undo(_) => "Failed to undo action".to_owned(),
                    Origin::User => format!("Failed to {} employee", pending.mutation.verb()),
                };
                self.notices.push(Notice::error(message));
                if let Origin::Undo(entry) = pending.origin {
                    self.history.reinstate(entry);
                }
                return Err(err.into());
            }
        };

        let entry = self.apply_ack(&pending, ack, now_ms);
        tracing::info!(%ticket, verb = pending.mutation.verb(), "mutation committed");

        match pending.origin {
            Origin::User => {
                let message = self.committed_message(&pending);
                self.notices.push(Notice::success(message));
                if let Some(entry) = entry {
                    self.history.push(entry);
                }
            }
            Origin::Undo(undone) => {
                let message = match undone.kind {
                    HistoryKind::Update => "Action undone successfully",
                    HistoryKind::Add => "Employee addition undone",
                    HistoryKind::Delete => "Employee deletion undone",
                };
                self.notices.push(Notice::success(message));
            }
        }

        self.directory.rebuild(&self.employees);
        Ok(self.refresh(now_ms))
    }

    fn committed_message(&self, pending: &Pending) -> String {
        match &pending.mutation {
            Mutation::Create { .. } => "Employee added successfully".to_owned(),
            Mutation::Update { patch, .. } => match (&patch.manager_id, &pending.before) {
                (Some(Some(manager)), Some(before))
                    if *patch == EmployeePatch::reparent(Some(manager.clone())) =>
                {
                    let manager_name = self.directory.name_of(manager).unwrap_or(manager.as_str());
                    format!(
                        "{} have to report to {} \u{2014} employee updated successfully",
                        before.name, manager_name
                    )
                }
                _ => "Employee updated successfully".to_owned(),
            },
            Mutation::Delete { .. } => "Employee deleted successfully".to_owned(),
            Mutation::Restore { .. } => "Employee restored successfully".to_owned(),
        }
    }

    /// Splice the acknowledged change into the snapshot and describe it as
    /// a history entry.
    fn apply_ack(&mut self, pending: &Pending, ack: Ack, now_ms: f64) -> Option<HistoryEntry> {
        match ack {
            Ack::Created(employee) | Ack::Restored(employee) => {
                self.employees.retain(|e| e.id != employee.id);
                self.employees.push(employee.clone());
                Some(HistoryEntry::added(employee, now_ms))
            }
            Ack::Updated(employee) => {
                match self.employees.iter_mut().find(|e| e.id == employee.id) {
                    Some(slot) => *slot = employee.clone(),
                    None => self.employees.push(employee.clone()),
                }
                pending
                    .before
                    .clone()
                    .map(|before| HistoryEntry::updated(before, employee, now_ms))
            }
            Ack::Deleted => {
                let id = pending.mutation.target()?;
                self.employees.retain(|e| e.id != *id);
                pending
                    .before
                    .clone()
                    .map(|before| HistoryEntry::deleted(before, now_ms))
            }
        }
    }

    /// Issue `request`'s mutation against `repo` and apply the answer.
    pub fn run(
        &mut self,
        repo: &mut impl EmployeeRepository,
        request: &MutationRequest,
        now_ms: f64,
    ) -> Result<Option<AnimationHandle>> {
        let result = repo.execute(&request.mutation);
        self.complete(request.ticket, result, now_ms)
    }

    /// Take the notices accumulated since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl Default for OrgChart {
    fn default() -> Self {
        Self {
            config: OrgChartConfig::default(),
            layout: OrgTreeLayout::default(),
            employees: Vec::new(),
            directory: OrgDirectory::new(),
            filter: EmployeeFilter::default(),
            forest: Vec::new(),
            positions: Vec::new(),
            cards: CardIndex::new(),
            viewport: ViewportController::default(),
            drag: DragDropController::default(),
            history: ActionHistory::default(),
            pending: BTreeMap::new(),
            next_ticket: 1,
            space_held: false,
            notices: Vec::new(),
            animation: None,
            fitted: None,
        }
    }
}
