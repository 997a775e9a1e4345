//! Persist Module
//!
//! Safe persistence of a collection to a single JSON file.
//!
//! ## Responsibilities
//! - Read the collection, recovering from missing or corrupt files
//! - Restore the primary file from its `.backup` sibling
//! - Write with backup, temp file, atomic rename and read-back verification
//! - Refuse to persist an empty collection unless told it is intentional
//!
//! ## Files
//! ```text
//! ┌──────────────────────┐   copy before write   ┌─────────────────────────┐
//! │ devices.json         │ ────────────────────▶ │ devices.json.backup     │
//! │ (primary)            │                       │ (last known good)       │
//! └──────────▲───────────┘                       └────────────┬────────────┘
//!            │ rename (commit point)                          │ restore
//!            │                                                ▼
//! ┌──────────┴───────────┐                       overwrite primary
//! │ devices.json.tmp     │
//! │ (transient)          │
//! └──────────────────────┘
//! ```
//!
//! None of these functions take the path lock; callers hold a `PathPermit`
//! for the primary path around every call.

mod file;
mod reader;
mod restore;
mod writer;
mod health;

pub use file::{backup_path, initialize, load_collection, parse_collection, tmp_path};
pub use reader::read_safely;
pub use restore::{restore, RestoreOutcome};
pub use writer::{write_safely, EmptyWrite};
pub use health::{inspect, FileStatus, HealthReport};
