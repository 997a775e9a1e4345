//! # devicestore
//!
//! A durable store for device inventory records kept in one JSON file, with:
//! - Keyed in-process locking so read-modify-write sequences never interleave
//! - Backup before every write and atomic temp-file + rename commits
//! - Read-back verification of every write
//! - Automatic restore from backup on corruption
//! - A guard against persisting an empty collection by accident
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Callers (HTTP layer, CLI)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    CollectionStore                           │
//! │        (upsert / update / delete / list / get)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  PathLocks  │          │   Persist   │
//!   │  (per path) │          │ read/write  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                     ┌───────────────────────────┐
//!                     │ devices.json  .backup .tmp │
//!                     └───────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod lock;
pub mod persist;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::Config;
pub use record::DeviceRecord;
pub use store::{Action, CollectionStore, DeleteOutcome, UpdateOutcome, UpsertOutcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of devicestore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
