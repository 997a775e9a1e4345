//! Safe reader

use std::path::Path;

use crate::record::DeviceRecord;
use super::file::load_collection;
use super::restore::restore;

/// Read the collection, never failing
///
/// A missing, unparsable or non-array file falls back to the backup. If the
/// backup is unusable too, the result is an empty collection.
pub fn read_safely(path: &Path) -> Vec<DeviceRecord> {
    match load_collection(path) {
        Ok(records) => {
            tracing::debug!("Read {} records from {}", records.len(), path.display());
            records
        }
        Err(e) => {
            tracing::warn!(
                "Collection {} unreadable ({}), restoring from backup",
                path.display(),
                e
            );
            restore(path).into_records()
        }
    }
}
