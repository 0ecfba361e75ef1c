//! Concurrent handles on one shared session.
//!
//! Run: `cargo nextest run -p cmisdrive-driver concurrency_tests`

mod common;

use cmisdrive_driver::{CreateDisposition, FileAccess};
use common::*;
use std::thread;

#[test]
fn test_two_opens_of_same_path_are_independent() {
    let drive = TestDrive::new();
    drive.seed_file("/shared.txt", b"shared content");

    let a = drive.host.open("\\shared.txt", FileAccess::GENERIC_READ, CreateDisposition::Open).unwrap();
    let b = drive.open_rw("\\shared.txt", CreateDisposition::Open).unwrap();
    assert_ne!(a, b);

    drive.host.close(a).unwrap();

    // b is unaffected by closing a
    let mut buf = [0u8; 6];
    assert_eq!(drive.host.read(b, &mut buf, 0).unwrap(), 6);
    assert_eq!(&buf, b"shared");
    drive.host.write(b, b"SHARED", 0).unwrap();
    drive.host.close(b).unwrap();

    assert_remote_content(&drive, "/shared.txt", b"SHARED content");
    assert_eq!(drive.host.open_handles(), 0);
}

#[test]
fn test_closing_writer_does_not_disturb_other_writer() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"base");

    let a = drive.open_rw("\\f", CreateDisposition::Open).unwrap();
    let b = drive.open_rw("\\f", CreateDisposition::Open).unwrap();
    drive.host.write(a, b"aaaa", 0).unwrap();
    drive.host.write(b, b"bbbbbb", 0).unwrap();

    drive.host.close(a).unwrap();
    assert_remote_content(&drive, "/f", b"aaaa");

    // b still holds its own staged content; last commit wins
    let mut buf = [0u8; 8];
    let n = drive.host.read(b, &mut buf, 0).unwrap();
    assert_eq!(&buf[..n], b"bbbbbb");
    drive.host.close(b).unwrap();
    assert_remote_content(&drive, "/f", b"bbbbbb");
}

#[test]
fn test_parallel_writers_on_distinct_files() {
    let drive = TestDrive::new();
    drive.seed_dir("/out");

    thread::scope(|s| {
        for worker in 0..8u8 {
            let drive = &drive;
            s.spawn(move || {
                let path = format!("\\out\\file-{worker}.bin");
                let content = vec![worker; 1000 + usize::from(worker)];
                drive.host.write_all(&path, &content).unwrap();
            });
        }
    });

    assert_eq!(drive.names("\\out").len(), 8);
    for worker in 0..8u8 {
        let content = drive.remote_content(&format!("/out/file-{worker}.bin")).unwrap();
        assert_eq!(content.len(), 1000 + usize::from(worker));
        assert!(content.iter().all(|b| *b == worker));
    }
    assert_eq!(drive.host.open_handles(), 0);
}

#[test]
fn test_parallel_readers_of_same_file() {
    let drive = TestDrive::new();
    let content: Vec<u8> = (0..4096u32).map(|i| (i % 256) as u8).collect();
    drive.seed_file("/big.bin", &content);

    thread::scope(|s| {
        for reader in 0..6i64 {
            let drive = &drive;
            let content = &content;
            s.spawn(move || {
                let id = drive
                    .host
                    .open("\\big.bin", FileAccess::GENERIC_READ, CreateDisposition::Open)
                    .unwrap();
                let offset = reader * 500;
                let mut buf = [0u8; 256];
                let n = drive.host.read(id, &mut buf, offset).unwrap();
                let start = usize::try_from(offset).unwrap();
                assert_eq!(&buf[..n], &content[start..start + 256]);
                drive.host.close(id).unwrap();
            });
        }
    });
    assert_eq!(drive.host.open_handles(), 0);
}

#[test]
fn test_handles_opened_concurrently_get_distinct_ids() {
    let drive = TestDrive::new();
    drive.seed_file("/f", b"x");

    let ids: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let drive = &drive;
                s.spawn(move || {
                    drive
                        .host
                        .open("\\f", FileAccess::GENERIC_READ, CreateDisposition::Open)
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 16);
    assert_eq!(drive.host.open_handles(), 16);

    for id in ids {
        drive.host.close(id).unwrap();
    }
    assert_eq!(drive.host.open_handles(), 0);
}
