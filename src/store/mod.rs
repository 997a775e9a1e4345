//! Store Module
//!
//! The durable collection store that coordinates locking and persistence.
//!
//! ## Responsibilities
//! - Create the collection file on first open
//! - Run each read-modify-write under one permit for the file path
//! - Insert-or-update and delete by asset number
//! - Report what happened as tagged outcomes instead of errors

mod collection;
mod outcome;

pub use collection::CollectionStore;
pub use outcome::{Action, DeleteOutcome, UpdateOutcome, UpsertOutcome};
