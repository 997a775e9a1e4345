//! Read-only inspection of the collection file and its siblings

use std::path::Path;

use serde::Serialize;

use super::file::{backup_path, load_collection, tmp_path};

/// State of one collection file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FileStatus {
    Missing,
    Valid { records: usize },
    Corrupt { reason: String },
}

impl FileStatus {
    fn of(path: &Path) -> Self {
        if !path.exists() {
            return FileStatus::Missing;
        }
        match load_collection(path) {
            Ok(records) => FileStatus::Valid { records: records.len() },
            Err(e) => FileStatus::Corrupt { reason: e.to_string() },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, FileStatus::Valid { .. })
    }
}

/// Snapshot of primary, backup and temp files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub primary: FileStatus,
    pub backup: FileStatus,
    /// A temp file outlived its write (crash between write and rename)
    pub stale_tmp: bool,
}

impl HealthReport {
    /// Primary is readable as-is
    pub fn is_healthy(&self) -> bool {
        self.primary.is_valid()
    }
}

/// Inspect without repairing anything
pub fn inspect(path: &Path) -> HealthReport {
    HealthReport {
        primary: FileStatus::of(path),
        backup: FileStatus::of(&backup_path(path)),
        stale_tmp: tmp_path(path).exists(),
    }
}
