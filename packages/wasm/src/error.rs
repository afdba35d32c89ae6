//! Error taxonomy for the org chart core.
//!
//! No error is fatal: every failure leaves the chart state as it was
//! before the operation started.

use crate::graph::EmployeeId;
use crate::mutation::Ticket;

pub type Result<T> = std::result::Result<T, OrgChartError>;

/// A drop rejected locally. No mutation is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown employee: {id}")]
    UnknownEmployee { id: EmployeeId },

    #[error("cannot move {name} onto themselves")]
    SelfDrop { name: String },

    #[error("cannot move {name} to their own descendant {target}")]
    WouldCreateCycle { name: String, target: String },

    #[error("{name} is already reporting to {manager} - invalid move")]
    AlreadyReportsTo { name: String, manager: String },
}

/// Failure reported by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("network failure: {message}")]
    Network { message: String },

    #[error("employee not found: {id}")]
    NotFound { id: EmployeeId },

    #[error("request rejected: {message}")]
    Rejected { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UndoError {
    #[error("no actions to undo")]
    Empty,

    #[error("history entry for {id} has no snapshot to restore")]
    MissingSnapshot { id: EmployeeId },
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("minZoom ({min}) exceeds maxZoom ({max})")]
    ZoomRange { min: f32, max: f32 },

    #[error("historyCapacity must be at least 1")]
    ZeroHistory,
}

#[derive(Debug, thiserror::Error)]
pub enum OrgChartError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error(transparent)]
    Undo(#[from] UndoError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no pending mutation for ticket {ticket}")]
    UnknownTicket { ticket: Ticket },
}
