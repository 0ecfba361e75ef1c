//! In-process driver host.
//!
//! [`DriverHost`] plays the part of the driver runtime: it owns one
//! [`FileInfo`] per open handle and sequences the callbacks the way a
//! mounted volume would (`create_file` ... `cleanup` then `close_file`).
//! The CLI and the integration tests drive a [`CmisDrive`] through it.

use crate::filesystem::{CmisDrive, DriveOptions};
use crate::operations::{
    CreateDisposition, DiskSpace, DriverOperations, FileAccess, FileInfo, FileInformation, VolumeInformation,
};
use cmisdrive_core::Repository;
use cmisdrive_mount::{HandleId, HandleTable, NtStatus};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Size of the chunks [`DriverHost::read_all`] requests.
const READ_CHUNK: usize = 64 * 1024;

/// Failure of a host-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HostError {
    /// A callback returned a non-success status.
    #[error("{0}")]
    Status(NtStatus),

    #[error("Handle {0} is not open")]
    UnknownHandle(HandleId),
}

impl HostError {
    /// Status reported to the caller, if the failure came from a callback.
    pub fn status(self) -> Option<NtStatus> {
        match self {
            Self::Status(status) => Some(status),
            Self::UnknownHandle(_) => None,
        }
    }
}

impl From<NtStatus> for HostError {
    fn from(status: NtStatus) -> Self {
        Self::Status(status)
    }
}

pub type HostResult<T> = Result<T, HostError>;

fn check(status: NtStatus) -> HostResult<()> {
    if status.is_success() { Ok(()) } else { Err(HostError::Status(status)) }
}

#[derive(Debug)]
struct OpenFile {
    path: String,
    info: FileInfo,
}

type SharedFile = Arc<Mutex<OpenFile>>;

/// Owns open handles and routes calls to a [`CmisDrive`].
#[derive(Debug)]
pub struct DriverHost {
    drive: CmisDrive,
    handles: HandleTable<SharedFile>,
    process_id: u32,
}

impl DriverHost {
    pub fn new(repo: Arc<dyn Repository>, options: DriveOptions) -> Self {
        Self::from_drive(CmisDrive::with_options(repo, options))
    }

    pub fn from_drive(drive: CmisDrive) -> Self {
        Self {
            drive,
            handles: HandleTable::new(),
            process_id: std::process::id(),
        }
    }

    pub fn drive(&self) -> &CmisDrive {
        &self.drive
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    fn register(&self, path: &str, info: FileInfo) -> HandleId {
        let id = self.handles.open(Arc::new(Mutex::new(OpenFile { path: path.to_string(), info })));
        debug!(handle = %id, path, "Handle opened");
        id
    }

    fn file(&self, id: HandleId) -> HostResult<SharedFile> {
        self.handles.get(id).ok_or(HostError::UnknownHandle(id))
    }

    /// Run a callback against the state of an open handle.
    fn with_file<R>(&self, id: HandleId, f: impl FnOnce(&CmisDrive, &str, &mut FileInfo) -> R) -> HostResult<R> {
        let file = self.file(id)?;
        let mut file = file.lock();
        let OpenFile { path, info } = &mut *file;
        Ok(f(&self.drive, path, info))
    }

    /// Open or create a file.
    pub fn open(&self, path: &str, access: FileAccess, disposition: CreateDisposition) -> HostResult<HandleId> {
        let mut info = FileInfo::new(self.process_id);
        check(self.drive.create_file(path, access, disposition, &mut info))?;
        Ok(self.register(path, info))
    }

    pub fn open_directory(&self, path: &str) -> HostResult<HandleId> {
        let mut info = FileInfo::directory(self.process_id);
        check(self.drive.open_directory(path, &mut info))?;
        Ok(self.register(path, info))
    }

    /// Create a folder. The handle is closed again right away.
    pub fn create_directory(&self, path: &str) -> HostResult<()> {
        let mut info = FileInfo::directory(self.process_id);
        check(self.drive.create_directory(path, &mut info))?;
        let id = self.register(path, info);
        self.close(id)
    }

    pub fn read(&self, id: HandleId, buffer: &mut [u8], offset: i64) -> HostResult<usize> {
        let (status, read) = self.with_file(id, |drive, path, info| drive.read_file(path, buffer, offset, info))?;
        check(status)?;
        Ok(read)
    }

    pub fn write(&self, id: HandleId, data: &[u8], offset: i64) -> HostResult<usize> {
        let (status, written) = self.with_file(id, |drive, path, info| drive.write_file(path, data, offset, info))?;
        check(status)?;
        Ok(written)
    }

    pub fn flush(&self, id: HandleId) -> HostResult<()> {
        check(self.with_file(id, |drive, path, info| drive.flush_file_buffers(path, info))?)
    }

    pub fn set_len(&self, id: HandleId, length: i64) -> HostResult<()> {
        check(self.with_file(id, |drive, path, info| drive.set_end_of_file(path, length, info))?)
    }

    pub fn set_allocation(&self, id: HandleId, length: i64) -> HostResult<()> {
        check(self.with_file(id, |drive, path, info| drive.set_allocation_size(path, length, info))?)
    }

    /// Attribute record as seen through an open handle, including staged length.
    pub fn stat_handle(&self, id: HandleId) -> HostResult<FileInformation> {
        let (status, information) = self.with_file(id, |drive, path, info| drive.get_file_information(path, info))?;
        check(status)?;
        information.ok_or(HostError::Status(NtStatus::FileNotFound))
    }

    /// Close a handle: `cleanup` followed by `close_file`.
    ///
    /// The handle is gone afterwards even when a callback fails. A commit
    /// that failed in cleanup but succeeded on the retry in close counts as
    /// success.
    pub fn close(&self, id: HandleId) -> HostResult<()> {
        let file = self.handles.close(id).ok_or(HostError::UnknownHandle(id))?;
        let mut file = file.lock();
        let OpenFile { path, info } = &mut *file;
        let cleanup = self.drive.cleanup(path, info);
        let close = self.drive.close_file(path, info);
        debug!(handle = %id, %cleanup, %close, "Handle closed");
        // Delete failures surface from cleanup; commit failures from close_file's retry
        if info.delete_on_close && !cleanup.is_success() {
            return Err(HostError::Status(cleanup));
        }
        check(close)
    }

    /// Attribute record of a path.
    pub fn stat(&self, path: &str) -> HostResult<FileInformation> {
        let mut info = FileInfo::new(self.process_id);
        let (status, information) = self.drive.get_file_information(path, &mut info);
        check(status)?;
        information.ok_or(HostError::Status(NtStatus::FileNotFound))
    }

    /// Folder listing, optionally filtered by a search pattern.
    pub fn list(&self, path: &str, pattern: Option<&str>) -> HostResult<Vec<FileInformation>> {
        let mut info = FileInfo::directory(self.process_id);
        let (status, files) = match pattern {
            Some(pattern) => self.drive.find_files_with_pattern(path, pattern, &mut info),
            None => self.drive.find_files(path, &mut info),
        };
        check(status)?;
        Ok(files)
    }

    /// Delete a document: pre-check, mark delete-on-close, close.
    pub fn delete_file(&self, path: &str) -> HostResult<()> {
        let id = self.open(path, FileAccess::DELETE, CreateDisposition::Open)?;
        self.delete_open(id, |drive, path, info| drive.delete_file(path, info))
    }

    /// Delete a folder, subject to the configured delete policy.
    pub fn delete_directory(&self, path: &str) -> HostResult<()> {
        let id = self.open_directory(path)?;
        self.delete_open(id, |drive, path, info| drive.delete_directory(path, info))
    }

    fn delete_open(&self, id: HandleId, precheck: impl FnOnce(&CmisDrive, &str, &mut FileInfo) -> NtStatus) -> HostResult<()> {
        let status = self.with_file(id, |drive, path, info| {
            let status = precheck(drive, path, info);
            info.delete_on_close = status.is_success();
            status
        })?;
        let closed = self.close(id);
        check(status)?;
        closed
    }

    /// Move or rename `from` to `to`.
    pub fn rename(&self, from: &str, to: &str, replace: bool) -> HostResult<()> {
        let id = self.open(from, FileAccess::DELETE, CreateDisposition::Open)?;
        let status = self.with_file(id, |drive, path, info| drive.move_file(path, to, replace, info));
        let closed = self.close(id);
        check(status?)?;
        closed
    }

    pub fn disk_space(&self) -> DiskSpace {
        let mut info = FileInfo::new(self.process_id);
        self.drive.get_disk_free_space(&mut info).1
    }

    pub fn volume(&self) -> VolumeInformation {
        let mut info = FileInfo::new(self.process_id);
        self.drive.get_volume_information(&mut info).1
    }

    /// Read a whole document from offset 0.
    pub fn read_all(&self, path: &str) -> HostResult<Vec<u8>> {
        let id = self.open(path, FileAccess::GENERIC_READ, CreateDisposition::Open)?;
        let mut content = Vec::new();
        let mut chunk = vec![0u8; READ_CHUNK];
        let result = loop {
            let offset = i64::try_from(content.len()).map_err(|_| HostError::Status(NtStatus::BufferOverflow));
            match offset.and_then(|offset| self.read(id, &mut chunk, offset)) {
                Ok(0) => break Ok(()),
                Ok(n) => content.extend_from_slice(&chunk[..n]),
                Err(e) => break Err(e),
            }
        };
        let closed = self.close(id);
        result?;
        closed?;
        Ok(content)
    }

    /// Replace (or create) a document with `content`.
    pub fn write_all(&self, path: &str, content: &[u8]) -> HostResult<()> {
        let id = self.open(path, FileAccess::GENERIC_WRITE, CreateDisposition::Create)?;
        let written = self.write(id, content, 0);
        let closed = self.close(id);
        written?;
        closed
    }

    /// Close every open handle and signal unmount.
    pub fn unmount(&self) -> NtStatus {
        let mut first_failure = None;
        for (id, file) in self.handles.drain() {
            let mut file = file.lock();
            let OpenFile { path, info } = &mut *file;
            self.drive.cleanup(path, info);
            let status = self.drive.close_file(path, info);
            if !status.is_success() {
                warn!(handle = %id, path = %path, %status, "Handle failed to close at unmount");
                first_failure.get_or_insert(status);
            }
        }
        let mut info = FileInfo::new(self.process_id);
        let status = self.drive.unmount(&mut info);
        info!(%status, "Driver host stopped");
        first_failure.unwrap_or(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmisdrive_core::MemoryRepository;

    fn host() -> DriverHost {
        DriverHost::new(Arc::new(MemoryRepository::new()), DriveOptions::default())
    }

    #[test]
    fn test_unknown_handle() {
        let host = host();
        let id = HandleId::from_raw(99);
        assert_eq!(host.close(id), Err(HostError::UnknownHandle(id)));
        assert_eq!(host.flush(id), Err(HostError::UnknownHandle(id)));
        assert_eq!(HostError::UnknownHandle(id).status(), None);
    }

    #[test]
    fn test_close_removes_handle() {
        let host = host();
        let id = host.open("\\a", FileAccess::GENERIC_WRITE, CreateDisposition::CreateNew).unwrap();
        assert_eq!(host.open_handles(), 1);
        host.close(id).unwrap();
        assert_eq!(host.open_handles(), 0);
    }

    #[test]
    fn test_status_errors_display_name() {
        let err = HostError::from(NtStatus::FileNotFound);
        assert_eq!(err.status(), Some(NtStatus::FileNotFound));
        assert!(err.to_string().starts_with("STATUS_OBJECT_NAME_NOT_FOUND"));
    }

    #[test]
    fn test_unmount_commits_open_handles() {
        let host = host();
        let id = host.open("\\a", FileAccess::GENERIC_WRITE, CreateDisposition::CreateNew).unwrap();
        host.write(id, b"pending", 0).unwrap();
        assert_eq!(host.unmount(), NtStatus::Success);
        assert_eq!(host.open_handles(), 0);
        assert_eq!(host.read_all("\\a").unwrap(), b"pending");
    }
}
