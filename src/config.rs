//! Configuration for devicestore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Main configuration for a CollectionStore
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the collection file and its siblings
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── devices.json          (primary collection)
    ///     ├── devices.json.backup   (copy taken before every write)
    ///     └── devices.json.tmp      (only between write and rename)
    pub data_dir: PathBuf,

    /// Name of the primary collection file inside `data_dir`
    pub file_name: String,

    // -------------------------------------------------------------------------
    // Record Configuration
    // -------------------------------------------------------------------------
    /// Attribution stamped into `modifiedBy` on every accepted write
    pub modified_by: String,

    // -------------------------------------------------------------------------
    // Lock Configuration
    // -------------------------------------------------------------------------
    /// Max time to wait for the path lock (None waits forever)
    pub lock_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./devices"),
            file_name: "devices.json".to_string(),
            modified_by: "script".to_string(),
            lock_timeout: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the primary collection file
    pub fn collection_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Reject configurations that cannot name a collection file
    pub fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(StoreError::Config("file_name must not be empty".to_string()));
        }
        if self.file_name.contains(|c: char| c == '/' || c == '\\') {
            return Err(StoreError::Config(format!(
                "file_name must be a bare file name, got {:?}",
                self.file_name
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the collection file name
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    /// Set the `modifiedBy` attribution
    pub fn modified_by(mut self, who: impl Into<String>) -> Self {
        self.config.modified_by = who.into();
        self
    }

    /// Bound the wait for the path lock
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.lock_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
