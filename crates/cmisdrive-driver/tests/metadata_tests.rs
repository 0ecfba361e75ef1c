//! Attribute records, volume identity and the acknowledged no-op callbacks.
//!
//! Run: `cargo nextest run -p cmisdrive-driver metadata_tests`

mod common;

use cmisdrive_core::{MemoryRepository, RepoPath, Repository};
use cmisdrive_driver::{
    Capacity, CreateDisposition, DriveOptions, DriverHost, DriverOperations, FileAttributes, FileInfo,
    FileSystemFeatures, FALLBACK_VOLUME_LABEL, NtStatus,
};
use common::*;
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

// =============================================================================
// File information
// =============================================================================

#[test]
fn test_stat_document_uses_object_metadata() {
    let drive = TestDrive::new();
    let seeded = drive.seed_file("/dir/report.pdf", &[7u8; 1234]);

    let info = drive.host.stat("\\dir\\report.pdf").unwrap();
    assert_eq!(info.file_name, "report.pdf");
    assert_eq!(info.attributes, FileAttributes::NORMAL);
    assert_eq!(info.length, 1234);
    assert_eq!(info.creation_time, seeded.created);
    assert_eq!(info.last_write_time, seeded.modified);
    assert!(info.creation_time.is_some());
}

#[test]
fn test_stat_folder() {
    let drive = TestDrive::new();
    drive.seed_dir("/dir");

    let info = drive.host.stat("\\dir").unwrap();
    assert!(info.attributes.is_directory());
    assert_eq!(info.length, 0);
    assert!(drive.host.stat("\\").unwrap().attributes.is_directory());
}

#[test]
fn test_stat_missing_is_file_not_found() {
    let drive = TestDrive::new();
    assert_status(drive.host.stat("\\missing"), NtStatus::FileNotFound);
}

#[test]
fn test_listing_and_stat_agree() {
    let drive = TestDrive::new();
    drive.seed_file("/dir/a.txt", b"aaa");
    drive.seed_file("/dir/b.txt", b"b");
    drive.seed_dir("/dir/sub");

    for entry in drive.host.list("\\dir", None).unwrap() {
        let single = drive.host.stat(&format!("\\dir\\{}", entry.file_name)).unwrap();
        assert_eq!(single, entry, "listing and stat differ for {}", entry.file_name);
    }
}

#[test]
fn test_stat_handle_reports_staged_length() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"abc");
    let id = drive.open_rw("\\f", CreateDisposition::Open).unwrap();
    drive.host.write(id, b"defgh", 3).unwrap();

    assert_eq!(drive.host.stat_handle(id).unwrap().length, 8);
    assert_eq!(drive.host.stat("\\f").unwrap().length, 3);
    drive.host.close(id).unwrap();
    assert_eq!(drive.host.stat("\\f").unwrap().length, 8);
}

#[test]
fn test_listing_with_pattern() {
    let drive = TestDrive::new();
    drive.seed_file("/a.txt", b"");
    drive.seed_file("/B.TXT", b"");
    drive.seed_file("/c.md", b"");

    let mut names: Vec<_> = drive
        .host
        .list("\\", Some("*.txt"))
        .unwrap()
        .into_iter()
        .map(|f| f.file_name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["B.TXT", "a.txt"]);
    assert_eq!(drive.host.list("\\", Some("?.md")).unwrap().len(), 1);
    assert_eq!(drive.host.list("\\", Some("*")).unwrap().len(), 3);
}

#[test]
fn test_listing_a_document_is_path_not_found() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"x");
    assert_status(drive.host.list("\\f", None), NtStatus::PathNotFound);
    assert_status(drive.host.list("\\missing", None), NtStatus::PathNotFound);
}

// =============================================================================
// Attribute and time setters
// =============================================================================

#[test]
fn test_setters_acknowledge_existing_objects() {
    let drive = TestDrive::new();
    let seeded = drive.seed_file("/f", b"abc");
    let ops = drive.host.drive();
    let mut info = FileInfo::new(1);

    assert_eq!(ops.set_file_attributes("\\f", FileAttributes::READONLY, &mut info), NtStatus::Success);
    let when = Some(UNIX_EPOCH + Duration::from_secs(1_000_000));
    assert_eq!(ops.set_file_time("\\f", when, when, when, &mut info), NtStatus::Success);

    let after = drive.host.stat("\\f").unwrap();
    assert_eq!(after.attributes, FileAttributes::NORMAL);
    assert_eq!(after.last_write_time, seeded.modified);
}

#[test]
fn test_setters_on_missing_objects() {
    let drive = TestDrive::new();
    let ops = drive.host.drive();
    let mut info = FileInfo::new(1);
    assert_eq!(ops.set_file_attributes("\\x", FileAttributes::HIDDEN, &mut info), NtStatus::FileNotFound);
    assert_eq!(ops.set_file_time("\\x", None, None, None, &mut info), NtStatus::FileNotFound);
}

#[test]
fn test_lock_requires_document_handle() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"abc");
    let ops = drive.host.drive();

    let mut info = FileInfo::new(1);
    assert_eq!(
        ops.create_file("\\f", cmisdrive_driver::FileAccess::GENERIC_READ, CreateDisposition::Open, &mut info),
        NtStatus::Success
    );
    assert_eq!(ops.lock_file("\\f", 0, 10, &mut info), NtStatus::Success);
    assert_eq!(ops.unlock_file("\\f", 0, 10, &mut info), NtStatus::Success);

    let mut dir = FileInfo::directory(1);
    assert_eq!(ops.lock_file("\\", 0, 10, &mut dir), NtStatus::AccessDenied);
    assert_eq!(ops.unlock_file("\\", 0, 10, &mut dir), NtStatus::AccessDenied);
}

// =============================================================================
// Volume
// =============================================================================

#[test]
fn test_volume_label_from_product_name() {
    let drive = TestDrive::new();
    let volume = drive.host.volume();
    assert_eq!(volume.volume_label, MemoryRepository::PRODUCT_NAME);
    assert_eq!(volume.maximum_component_length, 255);
    assert!(volume.features.contains(FileSystemFeatures::CASE_PRESERVED_NAMES));
    assert!(volume.features.contains(FileSystemFeatures::UNICODE_ON_DISK));
}

#[test]
fn test_volume_label_override_and_fallback() {
    let options = DriveOptions {
        volume_label: Some("Contracts".to_string()),
        ..DriveOptions::default()
    };
    assert_eq!(TestDrive::with_options(options).host.volume().volume_label, "Contracts");

    let host = DriverHost::new(Arc::new(MemoryRepository::with_product_name("")), DriveOptions::default());
    assert_eq!(host.volume().volume_label, FALLBACK_VOLUME_LABEL);
}

#[test]
fn test_disk_space() {
    let default = TestDrive::new().host.disk_space();
    assert_eq!(default.used_bytes, 500_000_000);
    assert_eq!(default.free_bytes, 1_000_000_000);

    let options = DriveOptions {
        capacity: Capacity { used_bytes: 10, free_bytes: 90 },
        ..DriveOptions::default()
    };
    let custom = TestDrive::with_options(options).host.disk_space();
    assert_eq!(custom.total_bytes, 100);
}

#[test]
fn test_unmount() {
    let drive = TestDrive::new();
    assert_eq!(drive.host.unmount(), NtStatus::Success);
    // Repository is untouched
    assert!(drive.repo.object_by_path(&RepoPath::root()).unwrap().is_folder());
}
