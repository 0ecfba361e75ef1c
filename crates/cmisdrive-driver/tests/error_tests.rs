//! Remote faults and their translated statuses.
//!
//! Faults are injected into the in-memory repository. Opaque faults during
//! mutation collapse to `AccessDenied`; failures around staged content report
//! `DiskFull` and leave the remote content untouched.
//!
//! Run: `cargo nextest run -p cmisdrive-driver error_tests`

mod common;

use cmisdrive_core::MemoryOp;
use cmisdrive_driver::{CreateDisposition, DriverOperations, FileAccess, FileInfo, NtStatus};
use common::*;

// =============================================================================
// Commit failures
// =============================================================================

#[test]
fn test_failed_flush_keeps_remote_content() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"previous");

    let id = drive.open_rw("\\f", CreateDisposition::Open).unwrap();
    drive.host.write(id, b"replaced", 0).unwrap();

    drive.repo.fail_always(MemoryOp::SetContentStream);
    assert_status(drive.host.flush(id), NtStatus::DiskFull);
    assert_remote_content(&drive, "/f", b"previous");

    assert_status(drive.host.close(id), NtStatus::DiskFull);
    assert_eq!(drive.host.open_handles(), 0);
    assert_remote_content(&drive, "/f", b"previous");
}

#[test]
fn test_flush_retry_after_transient_failure() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"previous");

    let id = drive.open_rw("\\f", CreateDisposition::Open).unwrap();
    drive.host.write(id, b"replaced", 0).unwrap();

    drive.repo.fail_next(MemoryOp::SetContentStream);
    assert_status(drive.host.flush(id), NtStatus::DiskFull);
    drive.host.flush(id).unwrap();
    assert_remote_content(&drive, "/f", b"replaced");
    drive.host.close(id).unwrap();
}

#[test]
fn test_failed_cleanup_commit_is_retried_on_close() {
    let drive = TestDrive::new();
    let id = drive.open_rw("\\f", CreateDisposition::CreateNew).unwrap();
    drive.host.write(id, b"eventually", 0).unwrap();

    drive.repo.fail_next(MemoryOp::SetContentStream);
    drive.host.close(id).unwrap();
    assert_remote_content(&drive, "/f", b"eventually");
    assert_eq!(drive.repo.call_count(MemoryOp::SetContentStream), 2);
}

#[test]
fn test_cleanup_reports_disk_full() {
    let drive = TestDrive::new();
    let mut info = FileInfo::new(1);
    let ops = drive.host.drive();
    assert_eq!(
        ops.create_file("\\f", FileAccess::GENERIC_WRITE, CreateDisposition::CreateNew, &mut info),
        NtStatus::Success
    );
    assert_eq!(ops.write_file("\\f", b"data", 0, &mut info), (NtStatus::Success, 4));

    drive.repo.fail_always(MemoryOp::SetContentStream);
    assert_eq!(ops.cleanup("\\f", &mut info), NtStatus::DiskFull);
    assert_eq!(ops.close_file("\\f", &mut info), NtStatus::DiskFull);
    assert!(info.context.is_none());
    assert_remote_content(&drive, "/f", b"");
}

#[test]
fn test_staging_load_failure_is_disk_full() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"abc");
    let id = drive.open_rw("\\f", CreateDisposition::Open).unwrap();

    drive.repo.fail_next(MemoryOp::ContentStream);
    assert_status(drive.host.write(id, b"x", 0), NtStatus::DiskFull);
    drive.repo.fail_next(MemoryOp::ContentStream);
    assert_status(drive.host.set_len(id, 1), NtStatus::DiskFull);

    drive.host.close(id).unwrap();
    assert_remote_content(&drive, "/f", b"abc");
}

// =============================================================================
// Mutation faults
// =============================================================================

#[test]
fn test_create_document_fault_is_access_denied() {
    let drive = TestDrive::new();
    drive.repo.fail_next(MemoryOp::CreateDocument);
    assert_status(drive.open_rw("\\f", CreateDisposition::CreateNew), NtStatus::AccessDenied);
    assert!(!drive.remote_exists("/f"));
}

#[test]
fn test_create_folder_fault_is_access_denied() {
    let drive = TestDrive::new();
    drive.repo.fail_next(MemoryOp::CreateFolder);
    assert_status(drive.host.create_directory("\\dir"), NtStatus::AccessDenied);
    assert!(!drive.remote_exists("/dir"));
}

#[test]
fn test_delete_fault_is_access_denied() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"still here");
    drive.repo.fail_next(MemoryOp::Delete);
    assert_status(drive.host.delete_file("\\f"), NtStatus::AccessDenied);
    assert_remote_content(&drive, "/f", b"still here");
}

#[test]
fn test_rename_fault_is_access_denied() {
    let drive = TestDrive::new();
    drive.seed_file("/a", b"a");
    drive.repo.fail_next(MemoryOp::Rename);
    assert_status(drive.host.rename("\\a", "\\b", false), NtStatus::AccessDenied);
    assert!(drive.remote_exists("/a"));
    assert!(!drive.remote_exists("/b"));
}

#[test]
fn test_replace_delete_fault_aborts_rename() {
    let drive = TestDrive::new();
    drive.seed_file("/a", b"a");
    drive.seed_file("/b", b"b");
    drive.repo.fail_next(MemoryOp::Delete);
    assert_status(drive.host.rename("\\a", "\\b", true), NtStatus::AccessDenied);
    assert_remote_content(&drive, "/a", b"a");
    assert_remote_content(&drive, "/b", b"b");
    assert_eq!(drive.names("\\"), vec!["a", "b"]);
}

#[test]
fn test_replace_rename_fault_keeps_destination() {
    let drive = TestDrive::new();
    drive.seed_file("/a", b"a");
    drive.seed_file("/b", b"b");
    drive.repo.fail_next(MemoryOp::Rename);
    assert_status(drive.host.rename("\\a", "\\b", true), NtStatus::AccessDenied);
    assert_remote_content(&drive, "/a", b"a");
    assert_remote_content(&drive, "/b", b"b");
    assert_eq!(drive.names("\\"), vec!["a", "b"]);
}

#[test]
fn test_replace_restores_destination_when_move_is_rejected() {
    let drive = TestDrive::new();
    drive.seed_file("/d/x", b"inside");

    // Moving a folder onto a document inside it fails after the destination
    // was already moved aside
    assert_status(drive.host.rename("\\d", "\\d\\x", true), NtStatus::AccessDenied);
    assert_remote_content(&drive, "/d/x", b"inside");
    assert_eq!(drive.names("\\d"), vec!["x"]);
    assert_eq!(drive.names("\\"), vec!["d"]);
}

#[test]
fn test_replace_leaves_no_displaced_entry() {
    let drive = TestDrive::new();
    drive.seed_file("/dir/a", b"new");
    drive.seed_file("/dir/b", b"old");
    drive.host.rename("\\dir\\a", "\\dir\\b", true).unwrap();
    assert_remote_content(&drive, "/dir/b", b"new");
    assert_eq!(drive.names("\\dir"), vec!["b"]);
}

// =============================================================================
// Lookup faults
// =============================================================================

#[test]
fn test_resolve_fault_is_not_absence() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"x");

    drive.repo.fail_next(MemoryOp::ObjectByPath);
    assert_status(drive.host.stat("\\f"), NtStatus::AccessDenied);
    drive.repo.fail_next(MemoryOp::ObjectByPath);
    assert_status(drive.open_rw("\\f", CreateDisposition::Open), NtStatus::AccessDenied);
    drive.repo.fail_next(MemoryOp::ObjectByPath);
    assert_status(drive.host.list("\\", None), NtStatus::AccessDenied);
}

#[test]
fn test_listing_fault_is_access_denied() {
    let drive = TestDrive::new();
    drive.repo.fail_next(MemoryOp::Children);
    assert_status(drive.host.list("\\", None), NtStatus::AccessDenied);
}

#[test]
fn test_content_fault_during_read() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"abc");
    let id = drive.host.open("\\f", FileAccess::GENERIC_READ, CreateDisposition::Open).unwrap();

    drive.repo.fail_next(MemoryOp::ContentStream);
    let mut buf = [0u8; 4];
    assert_status(drive.host.read(id, &mut buf, 0), NtStatus::AccessDenied);
    assert_eq!(drive.host.read(id, &mut buf, 0).unwrap(), 3);
    drive.host.close(id).unwrap();
}

#[test]
fn test_empty_document_needs_no_content_fetch() {
    let drive = TestDrive::new();
    drive.seed_file("/empty", b"");
    drive.repo.fail_always(MemoryOp::ContentStream);

    let id = drive.open_rw("\\empty", CreateDisposition::Open).unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(drive.host.read(id, &mut buf, 0).unwrap(), 0);
    drive.host.write(id, b"filled", 0).unwrap();
    drive.host.close(id).unwrap();
    assert_eq!(drive.repo.call_count(MemoryOp::ContentStream), 0);

    drive.repo.clear_faults();
    assert_remote_content(&drive, "/empty", b"filled");
}

#[test]
fn test_require_empty_children_fault() {
    let drive = TestDrive::new();
    drive.seed_dir("/dir");
    drive.repo.fail_next(MemoryOp::Children);
    assert_status(drive.host.delete_directory("\\dir"), NtStatus::AccessDenied);
    assert!(drive.remote_exists("/dir"));
}

// =============================================================================
// Unsupported callbacks
// =============================================================================

#[test]
fn test_security_and_streams_not_implemented() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"x");
    let ops = drive.host.drive();
    let mut info = FileInfo::new(1);

    assert_eq!(ops.get_file_security("\\f", &mut info), NtStatus::NotImplemented);
    assert_eq!(ops.set_file_security("\\f", &[1, 0, 4, 128], &mut info), NtStatus::NotImplemented);
    assert_eq!(ops.enumerate_named_streams("\\f", &mut info), NtStatus::NotImplemented);
}
