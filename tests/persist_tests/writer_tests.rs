//! Tests for the safe writer
//!
//! These tests verify:
//! - Written files are pretty-printed JSON arrays
//! - A backup of the previous file is taken before each write
//! - Empty collections are rejected unless marked intentional
//! - No temp file is left behind
//! - Concurrent readers never observe a partial file

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use devicestore::persist::{
    backup_path, load_collection, read_safely, tmp_path, write_safely, EmptyWrite,
};
use devicestore::DeviceRecord;
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_collection() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("devices.json");
    (temp_dir, path)
}

fn device(asset: &str) -> DeviceRecord {
    DeviceRecord::from_value(json!({
        "assetNumber": asset,
        "hostname": format!("host-{}", asset.to_lowercase()),
        "drives": { "localDrives": [], "otherDrives": [], "networkDrives": [] },
    }))
    .unwrap()
}

fn devices(count: usize) -> Vec<DeviceRecord> {
    (0..count).map(|i| device(&format!("A{}", i))).collect()
}

// =============================================================================
// Basic Write Tests
// =============================================================================

#[test]
fn test_write_and_read_back() {
    let (_temp, path) = setup_temp_collection();
    let collection = devices(3);

    assert!(write_safely(&path, &collection, EmptyWrite::Reject));
    assert_eq!(read_safely(&path), collection);
}

#[test]
fn test_write_is_pretty_printed() {
    let (_temp, path) = setup_temp_collection();
    let collection = vec![DeviceRecord::from_value(json!({"assetNumber": "A1"})).unwrap()];

    assert!(write_safely(&path, &collection, EmptyWrite::Reject));

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "[\n  {\n    \"assetNumber\": \"A1\"\n  }\n]");
}

#[test]
fn test_write_leaves_no_temp_file() {
    let (_temp, path) = setup_temp_collection();

    assert!(write_safely(&path, &devices(2), EmptyWrite::Reject));
    assert!(!tmp_path(&path).exists());
}

#[test]
fn test_first_write_has_no_backup() {
    let (_temp, path) = setup_temp_collection();

    assert!(write_safely(&path, &devices(1), EmptyWrite::Reject));
    assert!(!backup_path(&path).exists());
}

#[test]
fn test_backup_holds_previous_generation() {
    let (_temp, path) = setup_temp_collection();
    let first = devices(1);
    let second = devices(2);

    assert!(write_safely(&path, &first, EmptyWrite::Reject));
    let first_text = fs::read_to_string(&path).unwrap();

    assert!(write_safely(&path, &second, EmptyWrite::Reject));

    assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), first_text);
    assert_eq!(load_collection(&backup_path(&path)).unwrap(), first);
    assert_eq!(load_collection(&path).unwrap(), second);
}

// =============================================================================
// Empty Collection Guard Tests
// =============================================================================

#[test]
fn test_empty_write_is_rejected() {
    let (_temp, path) = setup_temp_collection();
    let collection = devices(2);
    assert!(write_safely(&path, &collection, EmptyWrite::Reject));

    assert!(!write_safely(&path, &[], EmptyWrite::Reject));

    assert_eq!(read_safely(&path), collection);
}

#[test]
fn test_empty_write_restores_backup_over_corrupt_primary() {
    let (_temp, path) = setup_temp_collection();
    let first = devices(1);
    assert!(write_safely(&path, &first, EmptyWrite::Reject));
    assert!(write_safely(&path, &devices(2), EmptyWrite::Reject));

    fs::write(&path, "garbage").unwrap();
    assert!(!write_safely(&path, &[], EmptyWrite::Reject));

    // Backup held the first generation and was put back
    assert_eq!(load_collection(&path).unwrap(), first);
}

#[test]
fn test_no_silent_full_loss_across_failed_empty_writes() {
    let (_temp, path) = setup_temp_collection();
    let collection = devices(4);
    assert!(write_safely(&path, &collection, EmptyWrite::Reject));

    for _ in 0..3 {
        assert!(!write_safely(&path, &[], EmptyWrite::Reject));
        assert_eq!(read_safely(&path), collection);
    }
}

#[test]
fn test_intentional_empty_write_is_persisted() {
    let (_temp, path) = setup_temp_collection();
    let collection = devices(1);
    assert!(write_safely(&path, &collection, EmptyWrite::Reject));

    assert!(write_safely(&path, &[], EmptyWrite::Intentional));

    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    assert_eq!(load_collection(&backup_path(&path)).unwrap(), collection);
}

#[test]
fn test_intentional_flag_does_not_affect_non_empty_writes() {
    let (_temp, path) = setup_temp_collection();
    let collection = devices(2);

    assert!(write_safely(&path, &collection, EmptyWrite::Intentional));
    assert_eq!(read_safely(&path), collection);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[cfg(unix)]
#[test]
fn test_write_into_read_only_directory_fails() {
    use std::os::unix::fs::PermissionsExt;

    let (temp, path) = setup_temp_collection();
    let collection = devices(1);
    assert!(write_safely(&path, &collection, EmptyWrite::Reject));
    let before = fs::read_to_string(&path).unwrap();

    fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o555)).unwrap();
    // Privileged users ignore directory permissions; nothing to test then.
    let probe = temp.path().join("probe");
    if fs::write(&probe, b"x").is_ok() {
        let _ = fs::remove_file(&probe);
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let ok = write_safely(&path, &devices(3), EmptyWrite::Reject);
    fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o755)).unwrap();

    assert!(!ok);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

// =============================================================================
// Atomic Visibility Tests
// =============================================================================

#[test]
fn test_concurrent_reader_never_sees_partial_file() {
    let (_temp, path) = setup_temp_collection();
    let small = devices(5);
    let large = devices(200);
    assert!(write_safely(&path, &small, EmptyWrite::Reject));

    let done = Arc::new(AtomicBool::new(false));

    // Raw reads bypass the lock on purpose: the rename alone must guarantee
    // that the file is always one complete generation.
    let reader = {
        let path = path.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut observed = 0;
            loop {
                let finished = done.load(Ordering::SeqCst);
                let records = load_collection(&path).expect("primary must always parse");
                assert!(records.len() == 5 || records.len() == 200, "saw {}", records.len());
                observed += 1;
                if finished {
                    return observed;
                }
            }
        })
    };

    for i in 0..40 {
        let collection = if i % 2 == 0 { &large } else { &small };
        assert!(write_safely(&path, collection, EmptyWrite::Reject));
    }
    done.store(true, Ordering::SeqCst);

    assert!(reader.join().unwrap() > 0);
}
