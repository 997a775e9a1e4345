//! CollectionStore implementation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::lock::{PathLocks, PathPermit};
use crate::persist::{
    self, inspect, read_safely, write_safely, EmptyWrite, HealthReport, RestoreOutcome,
};
use crate::record::{fields, now_rfc3339, DeviceRecord, Drives, IdGenerator};

use super::outcome::{Action, DeleteOutcome, UpdateOutcome, UpsertOutcome};

/// Durable store for one device collection file
///
/// ## Concurrency Model
///
/// Every operation, reads included, holds a permit for the collection path
/// from its first read to its last write. The permit table is shared through
/// `Arc<PathLocks>`, so several stores (or other components) pointing at the
/// same path serialize against each other when built with the same table.
///
/// All methods take `&self`; share the store as `Arc<CollectionStore>`.
pub struct CollectionStore {
    /// Store configuration
    config: Config,

    /// Primary collection file
    path: PathBuf,

    /// Keyed lock table, injected so it can be shared
    locks: Arc<PathLocks>,

    /// Surrogate ids for new records
    ids: IdGenerator,
}

impl CollectionStore {
    /// Open a store with its own lock table
    ///
    /// Creates the data directory and an empty collection if missing.
    pub fn open(config: Config) -> Result<Self> {
        Self::with_locks(config, Arc::new(PathLocks::new()))
    }

    /// Open a store that serializes through an existing lock table
    pub fn with_locks(config: Config, locks: Arc<PathLocks>) -> Result<Self> {
        config.validate()?;
        let path = config.collection_path();
        persist::initialize(&path)?;

        Ok(Self {
            config,
            path,
            locks,
            ids: IdGenerator::new(),
        })
    }

    /// Open with a collection file path (convenience method)
    ///
    /// Uses default config with the file's directory and name
    pub fn open_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                StoreError::Config(format!("not a usable file path: {}", path.display()))
            })?;
        let data_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let config = Config::builder()
            .data_dir(data_dir)
            .file_name(file_name)
            .build();
        Self::open(config)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current collection
    pub fn list(&self) -> Result<Vec<DeviceRecord>> {
        let _permit = self.lock()?;
        Ok(read_safely(&self.path))
    }

    /// First record with the given asset number
    pub fn get(&self, asset_number: &str) -> Result<Option<DeviceRecord>> {
        let _permit = self.lock()?;
        Ok(read_safely(&self.path)
            .into_iter()
            .find(|record| record.asset_number() == Some(asset_number)))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert or update a record keyed by its `assetNumber`
    ///
    /// Update keeps the stored `id` and `timestamp`, overwrites every
    /// submitted field and replaces `drives` wholesale. Insert assigns a new
    /// `id` and default (empty) drive lists.
    pub fn upsert(&self, payload: Map<String, Value>) -> Result<UpsertOutcome> {
        let asset_number = required_asset_number(&payload)?.to_string();
        let now = now_rfc3339();

        let _permit = self.lock()?;
        let mut records = read_safely(&self.path);

        let existing = records
            .iter()
            .position(|record| record.asset_number() == Some(asset_number.as_str()));

        let (record, action) = match existing {
            Some(index) => {
                let stored = &mut records[index];
                let id = stored.id().cloned();
                let created = stored.get(fields::TIMESTAMP).cloned();

                stored.merge_from(&payload);
                match id {
                    Some(id) => stored.set(fields::ID, id),
                    None => stored.remove(fields::ID),
                };
                stored.set(fields::TIMESTAMP, created.unwrap_or_else(|| json!(now)));
                stored.set(
                    fields::DRIVES,
                    Drives::from_value(payload.get(fields::DRIVES)).to_value(),
                );
                self.stamp(stored, &now);

                tracing::info!("Device updated: {}", asset_number);
                (stored.clone(), Action::Updated)
            }
            None => {
                let mut record = DeviceRecord::from_map(payload);
                record.set(fields::ID, json!(self.ids.next_id()));
                record.set(fields::TIMESTAMP, json!(now));
                let drives = record.drives().to_value();
                record.set(fields::DRIVES, drives);
                self.stamp(&mut record, &now);

                tracing::info!("Device added: {}", asset_number);
                records.push(record.clone());
                (record, Action::Added)
            }
        };

        let success = write_safely(&self.path, &records, EmptyWrite::Reject);
        Ok(UpsertOutcome { record, action, success })
    }

    /// Upsert from an arbitrary JSON value, which must be an object
    pub fn upsert_value(&self, payload: Value) -> Result<UpsertOutcome> {
        self.upsert(DeviceRecord::from_value(payload)?.into_map())
    }

    /// Patch an existing record
    ///
    /// `id`, `assetNumber` and `timestamp` are kept whatever the patch says.
    /// A patch carrying `drives` replaces them wholesale. Nothing is written
    /// when no record has the asset number.
    pub fn update(&self, asset_number: &str, patch: Map<String, Value>) -> Result<UpdateOutcome> {
        let now = now_rfc3339();

        let _permit = self.lock()?;
        let mut records = read_safely(&self.path);

        let Some(stored) = records
            .iter_mut()
            .find(|record| record.asset_number() == Some(asset_number))
        else {
            tracing::debug!("Update target not found: {}", asset_number);
            return Ok(UpdateOutcome::NotFound);
        };

        let kept: Vec<(&str, Option<Value>)> = [fields::ID, fields::ASSET_NUMBER, fields::TIMESTAMP]
            .into_iter()
            .map(|field| (field, stored.get(field).cloned()))
            .collect();

        stored.merge_from(&patch);
        for (field, value) in kept {
            match value {
                Some(value) => stored.set(field, value),
                None => stored.remove(field),
            };
        }
        if patch.contains_key(fields::DRIVES) {
            stored.set(
                fields::DRIVES,
                Drives::from_value(patch.get(fields::DRIVES)).to_value(),
            );
        }
        self.stamp(stored, &now);
        let record = stored.clone();

        tracing::info!("Device updated: {}", asset_number);
        let success = write_safely(&self.path, &records, EmptyWrite::Reject);
        Ok(UpdateOutcome::Updated { record, success })
    }

    /// Remove every record with the asset number
    ///
    /// Removing the last record is an intentional empty write and is
    /// persisted as `[]`.
    pub fn delete(&self, asset_number: &str) -> Result<DeleteOutcome> {
        let _permit = self.lock()?;
        let records = read_safely(&self.path);
        let before = records.len();

        let remaining: Vec<DeviceRecord> = records
            .into_iter()
            .filter(|record| record.asset_number() != Some(asset_number))
            .collect();
        let deleted_count = before - remaining.len();

        if deleted_count == 0 {
            tracing::debug!("Delete target not found: {}", asset_number);
            return Ok(DeleteOutcome::NotFound);
        }

        let empty = if remaining.is_empty() {
            EmptyWrite::Intentional
        } else {
            EmptyWrite::Reject
        };

        if !write_safely(&self.path, &remaining, empty) {
            tracing::error!("Delete of {} not applied; collection kept", asset_number);
            return Ok(DeleteOutcome::WriteFailed);
        }

        tracing::info!(
            "Deleted {} record(s) with asset number {}, {} remaining",
            deleted_count,
            asset_number,
            remaining.len()
        );
        Ok(DeleteOutcome::Deleted {
            deleted_count,
            remaining: remaining.len(),
        })
    }

    /// Replace the whole collection; an empty collection is rejected
    pub fn write(&self, collection: &[DeviceRecord]) -> Result<bool> {
        let _permit = self.lock()?;
        Ok(write_safely(&self.path, collection, EmptyWrite::Reject))
    }

    /// Restore the primary file from its backup
    pub fn restore(&self) -> Result<RestoreOutcome> {
        let _permit = self.lock()?;
        Ok(persist::restore(&self.path))
    }

    /// Inspect primary, backup and temp files without repairing them
    pub fn check(&self) -> Result<HealthReport> {
        let _permit = self.lock()?;
        Ok(inspect(&self.path))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the collection file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the shared lock table
    pub fn locks(&self) -> &Arc<PathLocks> {
        &self.locks
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn lock(&self) -> Result<PathPermit<'_>> {
        match self.config.lock_timeout {
            None => Ok(self.locks.acquire(&self.path)),
            Some(timeout) => self
                .locks
                .acquire_timeout(&self.path, timeout)
                .ok_or_else(|| StoreError::LockTimeout(self.path.clone())),
        }
    }

    fn stamp(&self, record: &mut DeviceRecord, now: &str) {
        record.set(fields::LAST_MODIFIED, json!(now));
        record.set(fields::MODIFIED_BY, json!(self.config.modified_by));
    }
}

fn required_asset_number(payload: &Map<String, Value>) -> Result<&str> {
    payload
        .get(fields::ASSET_NUMBER)
        .and_then(Value::as_str)
        .filter(|asset| !asset.is_empty())
        .ok_or_else(|| {
            StoreError::InvalidRecord("payload needs a non-empty string assetNumber".to_string())
        })
}
