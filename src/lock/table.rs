//! Path lock table
//!
//! A set of held paths guarded by a Mutex, plus a Condvar that every
//! release notifies.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Table of in-flight path keys
///
/// ## Concurrency:
/// - `held`: the set of paths with an outstanding permit
/// - `released`: notified whenever a permit is dropped; waiters re-check
///   their own key and go back to sleep if it is still taken
#[derive(Debug, Default)]
pub struct PathLocks {
    held: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `path` is free, then take it
    pub fn acquire(&self, path: &Path) -> PathPermit<'_> {
        let mut held = self.held.lock();
        while held.contains(path) {
            self.released.wait(&mut held);
        }
        held.insert(path.to_path_buf());
        tracing::trace!("Lock acquired: {}", path.display());

        PathPermit {
            locks: self,
            path: path.to_path_buf(),
        }
    }

    /// Like `acquire`, but give up after `timeout`
    pub fn acquire_timeout(&self, path: &Path, timeout: Duration) -> Option<PathPermit<'_>> {
        let deadline = Instant::now() + timeout;
        let mut held = self.held.lock();
        while held.contains(path) {
            if self.released.wait_until(&mut held, deadline).timed_out() && held.contains(path) {
                tracing::debug!("Lock wait timed out after {:?}: {}", timeout, path.display());
                return None;
            }
        }
        held.insert(path.to_path_buf());
        tracing::trace!("Lock acquired: {}", path.display());

        Some(PathPermit {
            locks: self,
            path: path.to_path_buf(),
        })
    }

    /// Take `path` only if nobody holds it
    pub fn try_acquire(&self, path: &Path) -> Option<PathPermit<'_>> {
        let mut held = self.held.lock();
        if !held.insert(path.to_path_buf()) {
            return None;
        }

        Some(PathPermit {
            locks: self,
            path: path.to_path_buf(),
        })
    }

    pub fn is_held(&self, path: &Path) -> bool {
        self.held.lock().contains(path)
    }

    /// Number of paths currently held
    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }

    fn release(&self, path: &Path) {
        let mut held = self.held.lock();
        held.remove(path);
        drop(held);
        // Waiters on other paths wake too and simply re-check their key.
        self.released.notify_all();
        tracing::trace!("Lock released: {}", path.display());
    }
}

/// Exclusive right to operate on one path; released on drop
#[derive(Debug)]
pub struct PathPermit<'a> {
    locks: &'a PathLocks,
    path: PathBuf,
}

impl PathPermit<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PathPermit<'_> {
    fn drop(&mut self) {
        self.locks.release(&self.path);
    }
}
