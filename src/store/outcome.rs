//! Outcome definitions
//!
//! What the store reports back for each mutating operation.

use std::fmt;

use serde::Serialize;

use crate::record::DeviceRecord;

/// Action tag attached to every mutation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    #[serde(rename = "added")]
    Added,
    #[serde(rename = "updated")]
    Updated,
    #[serde(rename = "deleted")]
    Deleted,
    #[serde(rename = "not found")]
    NotFound,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Action::Added => "added",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
            Action::NotFound => "not found",
        };
        f.write_str(tag)
    }
}

/// Result of an upsert
///
/// `record` is the record as it was submitted for persistence. When
/// `success` is false the write was rejected and the file holds the
/// previous (or restored) collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsertOutcome {
    pub record: DeviceRecord,
    pub action: Action,
    pub success: bool,
}

/// Result of an update of an existing record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum UpdateOutcome {
    #[serde(rename = "updated")]
    Updated { record: DeviceRecord, success: bool },
    #[serde(rename = "not found")]
    NotFound,
}

impl UpdateOutcome {
    pub fn action(&self) -> Action {
        match self {
            UpdateOutcome::Updated { .. } => Action::Updated,
            UpdateOutcome::NotFound => Action::NotFound,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { success: true, .. })
    }
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum DeleteOutcome {
    /// Every record with the key was removed and the write committed
    #[serde(rename = "deleted", rename_all = "camelCase")]
    Deleted { deleted_count: usize, remaining: usize },

    /// No record had the key; nothing was written
    #[serde(rename = "not found")]
    NotFound,

    /// Matching records existed but the write was not applied
    #[serde(rename = "write failed")]
    WriteFailed,
}

impl DeleteOutcome {
    /// Action that was attempted
    ///
    /// `WriteFailed` still reports `Deleted`, the same way an upsert keeps its
    /// action when `success` is false. Check `is_success` before treating the
    /// records as gone.
    pub fn action(&self) -> Action {
        match self {
            DeleteOutcome::Deleted { .. } | DeleteOutcome::WriteFailed => Action::Deleted,
            DeleteOutcome::NotFound => Action::NotFound,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted { .. })
    }
}
