//! Backup restore
//!
//! Recovers the primary file from `<path>.backup`.

use std::path::Path;

use crate::record::DeviceRecord;
use super::file::{backup_path, encode_collection, load_collection, replace_atomically};

/// Result of a restore attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    /// The backup was valid; these are its records
    Restored(Vec<DeviceRecord>),

    /// Neither primary nor backup is usable
    Unrecoverable,
}

impl RestoreOutcome {
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored(_))
    }

    /// Records to serve; empty when unrecoverable
    pub fn into_records(self) -> Vec<DeviceRecord> {
        match self {
            RestoreOutcome::Restored(records) => records,
            RestoreOutcome::Unrecoverable => Vec::new(),
        }
    }
}

/// Restore the primary file from its backup
///
/// On success the backup's records are written back over the primary
/// (temp file + rename) and returned. A failed write-back still returns the
/// records so readers are served; the next successful write repairs the file.
pub fn restore(path: &Path) -> RestoreOutcome {
    let backup = backup_path(path);

    let records = match load_collection(&backup) {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(
                "UNRECOVERABLE: primary {} and backup {} are both unusable ({}); collection degrades to empty",
                path.display(),
                backup.display(),
                e
            );
            return RestoreOutcome::Unrecoverable;
        }
    };

    let written = encode_collection(&records)
        .and_then(|text| replace_atomically(path, text.as_bytes()));
    match written {
        Ok(()) => tracing::info!(
            "Restored {} records from backup {}",
            records.len(),
            backup.display()
        ),
        Err(e) => tracing::warn!(
            "Backup {} is valid but could not be written to {}: {}",
            backup.display(),
            path.display(),
            e
        ),
    }

    RestoreOutcome::Restored(records)
}
