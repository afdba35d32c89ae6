//! ActionHistory - bounded undo log of acknowledged mutations.
//!
//! Entries are appended only after the collaborator acknowledged a change.
//! Undo pops the newest entry and turns it into its inverse mutation.
//! There is no redo: a popped entry is gone once its inverse succeeds.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::UndoError;
use crate::graph::{Employee, EmployeeId, EmployeePatch};
use crate::mutation::Mutation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryKind {
    Add,
    Update,
    Delete,
}

/// One acknowledged mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub employee_id: EmployeeId,
    /// Record before the change (None for `Add`).
    pub before: Option<Employee>,
    /// Record after the change (None for `Delete`).
    pub after: Option<Employee>,
    pub timestamp_ms: f64,
}

impl HistoryEntry {
    pub fn added(employee: Employee, timestamp_ms: f64) -> Self {
        Self {
            kind: HistoryKind::Add,
            employee_id: employee.id.clone(),
            before: None,
            after: Some(employee),
            timestamp_ms,
        }
    }

    pub fn updated(before: Employee, after: Employee, timestamp_ms: f64) -> Self {
        Self {
            kind: HistoryKind::Update,
            employee_id: before.id.clone(),
            before: Some(before),
            after: Some(after),
            timestamp_ms,
        }
    }

    pub fn deleted(employee: Employee, timestamp_ms: f64) -> Self {
        Self {
            kind: HistoryKind::Delete,
            employee_id: employee.id.clone(),
            before: Some(employee),
            after: None,
            timestamp_ms,
        }
    }

    /// The mutation that reverts this entry.
    ///
    /// An update is reverted with a patch carrying every field of the old
    /// record, so fields the original update never touched are restored too.
    pub fn inverse(&self) -> Option<Mutation> {
        match self.kind {
            HistoryKind::Add => Some(Mutation::Delete {
                id: self.employee_id.clone(),
            }),
            HistoryKind::Update => self.before.as_ref().map(|before| Mutation::Update {
                id: self.employee_id.clone(),
                patch: EmployeePatch::full(before),
            }),
            HistoryKind::Delete => self.before.as_ref().map(|before| Mutation::Restore {
                employee: before.clone(),
            }),
        }
    }
}

/// FIFO ring buffer of history entries.
#[derive(Debug, Clone)]
pub struct ActionHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl ActionHistory {
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, evicting the oldest one when full.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::debug!(id = %evicted.employee_id, kind = ?evicted.kind, "history entry evicted");
            }
        }
        self.entries.push_back(entry);
    }

    /// Put a popped entry back where its timestamp places it. Entries
    /// recorded since it was popped stay newer.
    pub fn reinstate(&mut self, entry: HistoryEntry) {
        let at = self
            .entries
            .partition_point(|e| e.timestamp_ms <= entry.timestamp_ms);
        self.entries.insert(at, entry);
        if self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::debug!(id = %evicted.employee_id, kind = ?evicted.kind, "history entry evicted");
            }
        }
    }

    /// Remove and return the newest entry.
    pub fn pop(&mut self) -> Result<HistoryEntry, UndoError> {
        self.entries.pop_back().ok_or(UndoError::Empty)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
