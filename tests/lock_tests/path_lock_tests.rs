//! Tests for PathLocks
//!
//! These tests verify:
//! - Mutual exclusion per path across threads
//! - Independence of different paths
//! - Waiters are woken on release
//! - Release on panic unwinding
//! - Timeouts when a permit is never released

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use devicestore::lock::PathLocks;

// =============================================================================
// Helper Functions
// =============================================================================

fn collection_path() -> PathBuf {
    PathBuf::from("/var/lib/devices/devices.json")
}

// =============================================================================
// Exclusion Tests
// =============================================================================

#[test]
fn test_only_one_holder_at_a_time() {
    let locks = Arc::new(PathLocks::new());
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            thread::spawn(move || {
                for _ in 0..50 {
                    let _permit = locks.acquire(&collection_path());
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    thread::yield_now();
                    inside.fetch_sub(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    assert_eq!(locks.held_count(), 0);
}

#[test]
fn test_different_paths_do_not_block() {
    let locks = PathLocks::new();

    let _a = locks.acquire(Path::new("/data/a.json"));
    let b = locks.acquire_timeout(Path::new("/data/b.json"), Duration::from_millis(50));

    assert!(b.is_some());
    assert_eq!(locks.held_count(), 2);
}

#[test]
fn test_permit_reports_its_path() {
    let locks = PathLocks::new();
    let permit = locks.acquire(&collection_path());
    assert_eq!(permit.path(), collection_path().as_path());
}

// =============================================================================
// Wake-up Tests
// =============================================================================

#[test]
fn test_waiter_wakes_on_release() {
    let locks = Arc::new(PathLocks::new());
    let permit = locks.acquire(&collection_path());

    let waiter = {
        let locks = Arc::clone(&locks);
        thread::spawn(move || {
            let start = Instant::now();
            let _permit = locks.acquire(&collection_path());
            start.elapsed()
        })
    };

    thread::sleep(Duration::from_millis(50));
    drop(permit);

    let waited = waiter.join().unwrap();
    assert!(waited >= Duration::from_millis(40));
    assert!(!locks.is_held(&collection_path()));
}

#[test]
fn test_timed_waiter_gets_lock_when_released_in_time() {
    let locks = Arc::new(PathLocks::new());
    let permit = locks.acquire(&collection_path());

    let waiter = {
        let locks = Arc::clone(&locks);
        thread::spawn(move || {
            locks
                .acquire_timeout(&collection_path(), Duration::from_secs(5))
                .is_some()
        })
    };

    thread::sleep(Duration::from_millis(20));
    drop(permit);

    assert!(waiter.join().unwrap());
}

// =============================================================================
// Failure Mode Tests
// =============================================================================

#[test]
fn test_permit_released_when_holder_panics() {
    let locks = Arc::new(PathLocks::new());

    let result = {
        let locks = Arc::clone(&locks);
        thread::spawn(move || {
            let _permit = locks.acquire(&collection_path());
            panic!("operation failed mid-write");
        })
        .join()
    };

    assert!(result.is_err());
    assert!(!locks.is_held(&collection_path()));
    assert!(locks.try_acquire(&collection_path()).is_some());
}

#[test]
fn test_leaked_permit_blocks_path_until_timeout() {
    let locks = PathLocks::new();

    std::mem::forget(locks.acquire(&collection_path()));

    let start = Instant::now();
    let second = locks.acquire_timeout(&collection_path(), Duration::from_millis(50));

    assert!(second.is_none());
    assert!(start.elapsed() >= Duration::from_millis(50));
    assert!(locks.is_held(&collection_path()));
}
