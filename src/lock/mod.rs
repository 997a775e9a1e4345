//! Lock Module
//!
//! Keyed mutual exclusion over collection file paths.
//!
//! ## Responsibilities
//! - Serialize every read-modify-write sequence against one path
//! - Release automatically when the permit goes out of scope
//! - Wake waiters on release (no polling)
//!
//! ## Scope
//! Advisory and in-process only. Two processes opening the same file each
//! get their own `PathLocks` and do not see each other. Sharing one file
//! between processes needs file-system level locking or a different store.
//!
//! Acquiring a path that the current thread already holds waits forever
//! (or until the timeout passed to `acquire_timeout`). Acquire once per
//! logical operation.

mod table;

pub use table::{PathLocks, PathPermit};
