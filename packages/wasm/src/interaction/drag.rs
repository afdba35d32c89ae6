//! DragDropController - drag-to-reparent gesture state machine.
//!
//! ```text
//! Idle ──press──▶ Armed ──hold / move──▶ Dragging ──release──▶ Idle (drop)
//!   ▲               │                       │
//!   └────release────┘ (tap)                 └──cancel──▶ Idle
//! ```
//!
//! Hit testing runs against the card index of the current layout, and
//! validity against the reporting directory of the full employee list.

use serde::{Deserialize, Serialize};

use super::InteractionConfig;
use super::press::{PointerKind, PressOutcome, PressTracker};
use crate::error::ValidationError;
use crate::graph::{EmployeeId, OrgDirectory};
use crate::spatial::CardIndex;
use crate::viewport::Point;

/// Live drag state, exposed to the host for highlighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragSession {
    pub dragged_id: EmployeeId,
    pub hovered_id: Option<EmployeeId>,
    pub is_valid: bool,
    /// Cards that move with the dragged one, itself included.
    pub moving_count: usize,
}

impl DragSession {
    fn new(dragged_id: EmployeeId, directory: &OrgDirectory) -> Self {
        Self {
            moving_count: directory.subtree_size(&dragged_id),
            dragged_id,
            hovered_id: None,
            is_valid: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Armed { id: EmployeeId, press: PressTracker },
    Dragging(DragSession),
}

/// What a drop resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Valid target: move `employee` under `new_manager`.
    Reparent {
        employee: EmployeeId,
        new_manager: EmployeeId,
    },
    /// Hovered target failed validation.
    Rejected(ValidationError),
    /// Released away from every card.
    NoTarget,
    /// Nothing was being dragged.
    Cancelled,
}

/// What lifting the pointer did.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    None,
    Tap(EmployeeId),
    Dropped(DropOutcome),
}

/// Check whether `dragged` may report to `target`.
///
/// Rejection order: unknown ids, self, descendant (would close a cycle),
/// already reporting there.
pub fn validate_drop(
    directory: &OrgDirectory,
    dragged: &EmployeeId,
    target: &EmployeeId,
) -> Result<(), ValidationError> {
    for id in [dragged, target] {
        if !directory.contains(id) {
            return Err(ValidationError::UnknownEmployee { id: id.clone() });
        }
    }
    let name = |id: &EmployeeId| directory.name_of(id).unwrap_or(id.as_str()).to_owned();

    if dragged == target {
        return Err(ValidationError::SelfDrop { name: name(dragged) });
    }
    if directory.is_above(dragged, target) {
        return Err(ValidationError::WouldCreateCycle {
            name: name(dragged),
            target: name(target),
        });
    }
    if directory.manager_of(dragged) == Some(target) {
        return Err(ValidationError::AlreadyReportsTo {
            name: name(dragged),
            manager: name(target),
        });
    }
    Ok(())
}

/// Drag-to-reparent controller.
pub struct DragDropController {
    config: InteractionConfig,
    state: DragState,
    hand_tool: bool,
}

impl DragDropController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
            hand_tool: false,
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, DragState::Armed { .. })
    }

    pub fn hand_tool(&self) -> bool {
        self.hand_tool
    }

    /// Toggle the pan tool. Turning it on abandons any pending drag.
    pub fn set_hand_tool(&mut self, enabled: bool) {
        self.hand_tool = enabled;
        if enabled {
            self.cancel_drag();
        }
    }

    /// Pointer or finger down on a card. Returns whether the press armed.
    pub fn press(
        &mut self,
        id: &EmployeeId,
        kind: PointerKind,
        screen: Point,
        now_ms: f64,
        directory: &OrgDirectory,
    ) -> bool {
        if self.hand_tool || !matches!(self.state, DragState::Idle) || !directory.contains(id) {
            return false;
        }
        self.state = DragState::Armed {
            id: id.clone(),
            press: PressTracker::new(kind, screen, now_ms),
        };
        true
    }

    /// Start dragging immediately, bypassing press disambiguation.
    pub fn begin_drag(&mut self, id: &EmployeeId, directory: &OrgDirectory) -> bool {
        if self.hand_tool || self.is_dragging() || !directory.contains(id) {
            return false;
        }
        tracing::debug!(id = %id, "drag started");
        self.state = DragState::Dragging(DragSession::new(id.clone(), directory));
        true
    }

    fn promote(&mut self, directory: &OrgDirectory) {
        let DragState::Armed { id, press } = &self.state else {
            return;
        };
        tracing::debug!(id = %id, promotion = ?press.promoted(), "press promoted to drag");
        let session = DragSession::new(id.clone(), directory);
        self.state = DragState::Dragging(session);
    }

    /// Timer callback while armed. Returns the session if a long press just
    /// started a drag.
    pub fn tick(&mut self, now_ms: f64, directory: &OrgDirectory) -> Option<&DragSession> {
        let promoted = match &mut self.state {
            DragState::Armed { press, .. } => press.tick(now_ms, &self.config).is_some(),
            _ => false,
        };
        if promoted {
            self.promote(directory);
            return self.session();
        }
        None
    }

    /// Pointer moved. `screen` feeds press disambiguation, `logical` feeds
    /// hit testing.
    pub fn pointer_move(
        &mut self,
        screen: Point,
        logical: Point,
        now_ms: f64,
        cards: &CardIndex,
        directory: &OrgDirectory,
    ) -> Option<&DragSession> {
        let promoted = match &mut self.state {
            DragState::Armed { press, .. } => press.update(screen, now_ms, &self.config).is_some(),
            _ => false,
        };
        if promoted {
            self.promote(directory);
        }
        self.update_hover(logical, cards, directory)
    }

    /// Recompute the hovered card and its validity against the current
    /// directory.
    pub fn update_hover(
        &mut self,
        logical: Point,
        cards: &CardIndex,
        directory: &OrgDirectory,
    ) -> Option<&DragSession> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        let hovered = cards
            .hit_test(logical.x, logical.y, self.config.hit_slop)
            .cloned();
        session.is_valid = hovered
            .as_ref()
            .is_some_and(|target| validate_drop(directory, &session.dragged_id, target).is_ok());
        session.hovered_id = hovered;
        Some(&*session)
    }

    /// Pointer or finger up.
    pub fn release(
        &mut self,
        screen: Point,
        logical: Point,
        now_ms: f64,
        cards: &CardIndex,
        directory: &OrgDirectory,
    ) -> ReleaseOutcome {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => ReleaseOutcome::None,
            DragState::Armed { id, press } => match press.release(screen, now_ms, &self.config) {
                PressOutcome::Tap if press.kind() == PointerKind::Touch => ReleaseOutcome::Tap(id),
                _ => ReleaseOutcome::None,
            },
            DragState::Dragging(session) => {
                self.state = DragState::Dragging(session);
                self.update_hover(logical, cards, directory);
                ReleaseOutcome::Dropped(self.drop(directory))
            }
        }
    }

    /// Finish the drag against the hovered card. Validity is checked again
    /// here since the directory may have changed mid-gesture.
    pub fn drop(&mut self, directory: &OrgDirectory) -> DropOutcome {
        let DragState::Dragging(session) = std::mem::replace(&mut self.state, DragState::Idle) else {
            return DropOutcome::Cancelled;
        };
        let Some(target) = session.hovered_id else {
            tracing::debug!(id = %session.dragged_id, "drag released without target");
            return DropOutcome::NoTarget;
        };
        match validate_drop(directory, &session.dragged_id, &target) {
            Ok(()) => DropOutcome::Reparent {
                employee: session.dragged_id,
                new_manager: target,
            },
            Err(err) => {
                tracing::warn!(error = %err, "drop rejected");
                DropOutcome::Rejected(err)
            }
        }
    }

    /// Abandon any armed or active drag. Returns whether anything was abandoned.
    pub fn cancel_drag(&mut self) -> bool {
        let was_active = !matches!(self.state, DragState::Idle);
        if was_active {
            tracing::debug!("drag cancelled");
        }
        self.state = DragState::Idle;
        was_active
    }
}

impl Default for DragDropController {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}
