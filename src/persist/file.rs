//! Collection file helpers
//!
//! Sibling path naming, parsing and the temp-file + rename primitive.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::record::DeviceRecord;

const BACKUP_SUFFIX: &str = ".backup";
const TMP_SUFFIX: &str = ".tmp";

/// `devices.json` → `devices.json.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, BACKUP_SUFFIX)
}

/// `devices.json` → `devices.json.tmp`
pub fn tmp_path(path: &Path) -> PathBuf {
    with_suffix(path, TMP_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Parse collection text: the root must be an array of objects
pub fn parse_collection(text: &str) -> Result<Vec<DeviceRecord>> {
    let root: Value = serde_json::from_str(text)?;

    let items = match root {
        Value::Array(items) => items,
        other => {
            return Err(StoreError::Corruption(format!(
                "root is {}, expected an array",
                crate::record::json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            DeviceRecord::from_value(item)
                .map_err(|_| StoreError::Corruption(format!("element {} is not an object", index)))
        })
        .collect()
}

/// Read and parse a collection file
pub fn load_collection(path: &Path) -> Result<Vec<DeviceRecord>> {
    let text = fs::read_to_string(path)?;
    parse_collection(&text)
}

/// Serialize as pretty-printed JSON (two-space indentation)
pub(crate) fn encode_collection(collection: &[DeviceRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(collection)?)
}

/// Replace `path` with `contents` via `<path>.tmp` and a rename
///
/// Readers see either the old file or the new one, never a partial write.
/// A leftover temp file is removed if any step fails.
pub(crate) fn replace_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = tmp_path(path);

    let result = write_and_rename(&temp_path, path, contents);
    if result.is_err() && temp_path.exists() {
        if let Err(e) = fs::remove_file(&temp_path) {
            tracing::warn!("Could not remove temp file {}: {}", temp_path.display(), e);
        }
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp_path, path)?;
    sync_parent_dir(path);
    Ok(())
}

/// Make the rename durable where the platform allows it
fn sync_parent_dir(path: &Path) {
    #[cfg(unix)]
    {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
            tracing::debug!("Directory sync skipped for {}: {}", parent.display(), e);
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

/// Create the parent directory and an empty collection if the file is absent
///
/// Returns `true` when a new file was created.
pub fn initialize(path: &Path) -> Result<bool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if path.exists() {
        tracing::info!("Collection file found: {}", path.display());
        return Ok(false);
    }

    tracing::info!("Collection file missing, creating empty collection: {}", path.display());
    replace_atomically(path, encode_collection(&[])?.as_bytes())?;
    Ok(true)
}
