//! Test harness for driver integration tests.
//!
//! Provides `TestDrive`, a [`DriverHost`] over a fresh in-memory repository,
//! plus seeding helpers and assertions.

// Not all tests use all helpers
#![allow(dead_code)]

use cmisdrive_core::{MemoryRepository, RepoObject, RepoPath, Repository};
use cmisdrive_driver::{
    CreateDisposition, DirectoryDeletePolicy, DriveOptions, DriverHost, FileAccess, FileInfo, HostError, NtStatus,
};
use std::sync::Arc;

/// A driver host over an in-memory repository.
pub struct TestDrive {
    pub repo: Arc<MemoryRepository>,
    pub host: DriverHost,
}

impl TestDrive {
    pub fn new() -> Self {
        Self::with_options(DriveOptions::default())
    }

    pub fn with_policy(policy: DirectoryDeletePolicy) -> Self {
        Self::with_options(DriveOptions {
            delete_directory_policy: policy,
            ..DriveOptions::default()
        })
    }

    pub fn with_options(options: DriveOptions) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let host = DriverHost::new(repo.clone(), options);
        Self { repo, host }
    }

    /// Seed a document directly in the repository, bypassing the driver.
    pub fn seed_file(&self, path: &str, content: &[u8]) -> RepoObject {
        self.repo
            .put_document(&RepoPath::new(path), content)
            .expect("seed document")
    }

    /// Seed a folder (and its ancestors) directly in the repository.
    pub fn seed_dir(&self, path: &str) -> RepoObject {
        self.repo.ensure_folder(&RepoPath::new(path)).expect("seed folder")
    }

    /// Content as stored remotely, bypassing any open handle.
    pub fn remote_content(&self, path: &str) -> Option<Vec<u8>> {
        let object = self.repo.object_by_path(&RepoPath::new(path)).ok()?;
        let mut stream = self.repo.content_stream(&object).ok()?;
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut stream, &mut content).ok()?;
        Some(content)
    }

    pub fn remote_exists(&self, path: &str) -> bool {
        self.repo.object_by_path(&RepoPath::new(path)).is_ok()
    }

    pub fn open_rw(&self, path: &str, disposition: CreateDisposition) -> Result<cmisdrive_driver::HandleId, HostError> {
        self.host
            .open(path, FileAccess::GENERIC_READ | FileAccess::GENERIC_WRITE, disposition)
    }

    /// Listing of a folder as sorted names.
    pub fn names(&self, path: &str) -> Vec<String> {
        let mut names: Vec<_> = self
            .host
            .list(path, None)
            .expect("list")
            .into_iter()
            .map(|f| f.file_name)
            .collect();
        names.sort();
        names
    }

    /// Fresh per-open info for calling the callbacks directly.
    pub fn info(&self) -> FileInfo {
        FileInfo::new(1)
    }
}

/// Assert a host call failed with `expected`.
#[track_caller]
pub fn assert_status<T: std::fmt::Debug>(result: Result<T, HostError>, expected: NtStatus) {
    match result {
        Err(HostError::Status(status)) => assert_eq!(status, expected),
        other => panic!("expected {expected}, got {other:?}"),
    }
}

#[track_caller]
pub fn assert_remote_content(drive: &TestDrive, path: &str, expected: &[u8]) {
    let actual = drive.remote_content(path).unwrap_or_else(|| panic!("{path} missing remotely"));
    assert_eq!(actual, expected, "remote content mismatch for {path}");
}
