//! Safe writer
//!
//! Persists a collection with backup, atomic replacement and verification.

use std::fs;
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::record::DeviceRecord;
use super::file::{backup_path, encode_collection, load_collection, replace_atomically};
use super::restore::restore;

/// How the writer treats an empty collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyWrite {
    /// An empty collection is treated as a fault: nothing is written, and the
    /// backup is restored only if the primary is unusable
    Reject,

    /// The caller confirmed the collection is meant to be empty (a delete
    /// removed the last record)
    Intentional,
}

/// Persist `collection` to `path`
///
/// Steps:
/// 1. Copy the current primary to `<path>.backup` (best-effort)
/// 2. Write pretty-printed JSON to `<path>.tmp` and fsync it
/// 3. Rename the temp file onto `path` (the commit point)
/// 4. Re-read `path` and check it holds exactly `collection.len()` records
///
/// Returns `true` only if the commit and the verification both succeed.
/// A failed commit or verification restores the backup and returns `false`;
/// the caller must then treat the logical write as not applied. A rejected
/// empty write also returns `false` but keeps a primary that still parses.
pub fn write_safely(path: &Path, collection: &[DeviceRecord], empty: EmptyWrite) -> bool {
    write_safely_with(path, collection, empty, commit)
}

pub(crate) fn write_safely_with<F>(
    path: &Path,
    collection: &[DeviceRecord],
    empty: EmptyWrite,
    commit_fn: F,
) -> bool
where
    F: FnOnce(&Path, &[DeviceRecord]) -> Result<()>,
{
    let expected = collection.len();

    if expected == 0 && empty == EmptyWrite::Reject {
        refuse_empty(path);
        return false;
    }

    tracing::debug!("Writing {} records to {}", expected, path.display());

    backup_primary(path);

    if let Err(e) = commit_fn(path, collection) {
        tracing::error!("Write to {} failed: {}", path.display(), e);
        restore(path);
        return false;
    }

    if let Err(e) = verify(path, expected) {
        tracing::error!("Verification of {} failed: {}", path.display(), e);
        restore(path);
        return false;
    }

    tracing::info!("Saved {} records to {}", expected, path.display());
    true
}

/// Handle a rejected empty write
///
/// A primary that still parses is left exactly as it is. The backup is only
/// put back when the primary is unusable, since it may be an older generation.
fn refuse_empty(path: &Path) {
    match load_collection(path) {
        Ok(records) => {
            tracing::warn!(
                "Refusing to write an empty collection to {}; keeping {} records",
                path.display(),
                records.len()
            );
        }
        Err(_) if !path.exists() && !backup_path(path).exists() => {
            tracing::warn!(
                "Refusing to write an empty collection to {}; nothing on disk yet",
                path.display()
            );
        }
        Err(e) => {
            tracing::warn!(
                "Refusing to write an empty collection to {}; primary unusable ({}), restoring backup",
                path.display(),
                e
            );
            restore(path);
        }
    }
}

/// Step 1: copy primary to backup; failures are only logged
fn backup_primary(path: &Path) {
    if !path.exists() {
        tracing::debug!("No primary at {} to back up", path.display());
        return;
    }

    let backup = backup_path(path);
    match fs::copy(path, &backup) {
        Ok(_) => tracing::debug!("Backup written: {}", backup.display()),
        Err(e) => tracing::warn!("Backup of {} failed: {}", path.display(), e),
    }
}

/// Steps 2 and 3
fn commit(path: &Path, collection: &[DeviceRecord]) -> Result<()> {
    let text = encode_collection(collection)?;
    replace_atomically(path, text.as_bytes())
}

/// Step 4
fn verify(path: &Path, expected: usize) -> Result<()> {
    let found = load_collection(path)?.len();
    if found != expected {
        return Err(StoreError::VerificationFailed { expected, found });
    }
    Ok(())
}
