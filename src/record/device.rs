//! DeviceRecord implementation
//!
//! A thin wrapper around a JSON object. Only identity, drives and the
//! audit fields are interpreted; everything else passes through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Result, StoreError};
use super::fields;

/// One tracked asset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceRecord(Map<String, Value>);

impl DeviceRecord {
    /// Wrap an existing field map
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Accept any JSON value that is an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(StoreError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Natural key, if present and a string
    pub fn asset_number(&self) -> Option<&str> {
        self.0.get(fields::ASSET_NUMBER).and_then(Value::as_str)
    }

    pub fn hostname(&self) -> Option<&str> {
        self.0.get(fields::HOSTNAME).and_then(Value::as_str)
    }

    /// Surrogate id, kept opaque because older files may hold non-integers
    pub fn id(&self) -> Option<&Value> {
        self.0.get(fields::ID)
    }

    /// Normalized view of the `drives` field
    pub fn drives(&self) -> Drives {
        Drives::from_value(self.0.get(fields::DRIVES))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, returning the previous value
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Shallow merge: every field of `patch` overwrites the stored one
    pub fn merge_from(&mut self, patch: &Map<String, Value>) {
        for (field, value) in patch {
            self.0.insert(field.clone(), value.clone());
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<DeviceRecord> for Value {
    fn from(record: DeviceRecord) -> Self {
        record.into_value()
    }
}

/// The three named drive lists of a record
///
/// Sub-lists that are missing or not arrays normalize to empty lists;
/// an incoming `drives` value always replaces the stored one wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drives {
    pub local_drives: Vec<Value>,
    pub other_drives: Vec<Value>,
    pub network_drives: Vec<Value>,
}

impl Drives {
    /// Read drives from a (possibly absent) `drives` value
    pub fn from_value(value: Option<&Value>) -> Self {
        let list = |key: &str| -> Vec<Value> {
            value
                .and_then(|drives| drives.get(key))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
        };

        Self {
            local_drives: list(fields::LOCAL_DRIVES),
            other_drives: list(fields::OTHER_DRIVES),
            network_drives: list(fields::NETWORK_DRIVES),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.local_drives.is_empty() && self.other_drives.is_empty() && self.network_drives.is_empty()
    }

    pub fn to_value(&self) -> Value {
        json!({
            (fields::LOCAL_DRIVES): self.local_drives,
            (fields::OTHER_DRIVES): self.other_drives,
            (fields::NETWORK_DRIVES): self.network_drives,
        })
    }
}

/// Short name of a JSON value's type for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
