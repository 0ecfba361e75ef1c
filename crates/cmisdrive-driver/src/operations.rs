//! Driver runtime interface.
//!
//! [`DriverOperations`] is the callback set a user-mode filesystem driver
//! runtime invokes. Every callback receives the driver-native path and the
//! per-open [`FileInfo`], and returns exactly one [`NtStatus`]. Out-parameters
//! are returned next to the status.

use cmisdrive_core::RepoObject;
use cmisdrive_mount::{NtStatus, StagingBuffer, path};
use std::ops::BitOr;
use std::time::SystemTime;

/// Requested access rights of an open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileAccess(u32);

impl FileAccess {
    pub const READ_DATA: Self = Self(0x0000_0001);
    pub const WRITE_DATA: Self = Self(0x0000_0002);
    pub const APPEND_DATA: Self = Self(0x0000_0004);
    pub const EXECUTE: Self = Self(0x0000_0020);
    pub const READ_ATTRIBUTES: Self = Self(0x0000_0080);
    pub const WRITE_ATTRIBUTES: Self = Self(0x0000_0100);
    pub const DELETE: Self = Self(0x0001_0000);
    pub const READ_CONTROL: Self = Self(0x0002_0000);
    pub const SYNCHRONIZE: Self = Self(0x0010_0000);
    pub const GENERIC_EXECUTE: Self = Self(0x2000_0000);
    pub const GENERIC_WRITE: Self = Self(0x4000_0000);
    pub const GENERIC_READ: Self = Self(0x8000_0000);

    /// Rights that touch file content.
    pub const DATA_ACCESS: Self = Self(
        Self::READ_DATA.0
            | Self::WRITE_DATA.0
            | Self::APPEND_DATA.0
            | Self::EXECUTE.0
            | Self::GENERIC_EXECUTE.0
            | Self::GENERIC_WRITE.0
            | Self::GENERIC_READ.0,
    );

    /// Rights that modify file content or existence.
    pub const DATA_WRITE_ACCESS: Self =
        Self(Self::WRITE_DATA.0 | Self::APPEND_DATA.0 | Self::DELETE.0 | Self::GENERIC_WRITE.0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True when the open only wants attributes or security information.
    pub const fn is_metadata_only(self) -> bool {
        !self.intersects(Self::DATA_ACCESS)
    }
}

impl BitOr for FileAccess {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// What an open does when the target exists or is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateDisposition {
    /// Create; fail if present.
    CreateNew,
    /// Create; truncate if present.
    Create,
    /// Open; fail if absent.
    Open,
    /// Open; create if absent.
    OpenOrCreate,
    /// Open and truncate; fail if absent.
    Truncate,
    /// Open for appending; create if absent.
    Append,
}

impl CreateDisposition {
    /// The target must already exist.
    pub const fn requires_existence(self) -> bool {
        matches!(self, Self::Open | Self::Truncate)
    }

    /// The target must not exist yet.
    pub const fn forbids_existence(self) -> bool {
        matches!(self, Self::CreateNew)
    }

    /// Existing content is discarded.
    pub const fn truncates(self) -> bool {
        matches!(self, Self::Create | Self::Truncate)
    }
}

/// Per-open state for a document.
#[derive(Debug)]
pub struct DocumentHandle {
    /// Object resolved when the handle was opened.
    pub object: RepoObject,
    /// Write staging, loaded on first write or resize.
    pub staging: Option<StagingBuffer>,
}

impl DocumentHandle {
    pub fn new(object: RepoObject) -> Self {
        Self { object, staging: None }
    }

    pub fn with_staging(object: RepoObject, staging: StagingBuffer) -> Self {
        Self { object, staging: Some(staging) }
    }

    /// True when staged content has not been committed yet.
    pub fn is_dirty(&self) -> bool {
        self.staging.as_ref().is_some_and(StagingBuffer::is_dirty)
    }
}

/// Open-handle context attached to a [`FileInfo`].
#[derive(Debug, Default)]
pub enum HandleContext {
    /// Nothing attached: metadata-only opens and closed handles.
    #[default]
    None,
    /// An opened folder.
    Directory,
    /// An opened document.
    Document(DocumentHandle),
}

impl HandleContext {
    pub fn document(&self) -> Option<&DocumentHandle> {
        match self {
            Self::Document(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn document_mut(&mut self) -> Option<&mut DocumentHandle> {
        match self {
            Self::Document(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Per-open information owned by the driver runtime.
#[derive(Debug, Default)]
pub struct FileInfo {
    pub context: HandleContext,
    pub is_directory: bool,
    pub delete_on_close: bool,
    pub write_to_end_of_file: bool,
    pub process_id: u32,
}

impl FileInfo {
    pub fn new(process_id: u32) -> Self {
        Self { process_id, ..Self::default() }
    }

    pub fn directory(process_id: u32) -> Self {
        Self { is_directory: true, process_id, ..Self::default() }
    }
}

/// File attribute flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileAttributes(u32);

impl FileAttributes {
    pub const READONLY: Self = Self(0x0001);
    pub const HIDDEN: Self = Self(0x0002);
    pub const DIRECTORY: Self = Self(0x0010);
    pub const ARCHIVE: Self = Self(0x0020);
    pub const NORMAL: Self = Self(0x0080);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_directory(self) -> bool {
        self.0 & Self::DIRECTORY.0 != 0
    }
}

/// Attribute record returned by information and listing callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInformation {
    pub file_name: String,
    pub attributes: FileAttributes,
    pub creation_time: Option<SystemTime>,
    pub last_access_time: Option<SystemTime>,
    pub last_write_time: Option<SystemTime>,
    pub length: u64,
}

/// Volume feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileSystemFeatures(u32);

impl FileSystemFeatures {
    pub const CASE_SENSITIVE_SEARCH: Self = Self(0x0000_0001);
    pub const CASE_PRESERVED_NAMES: Self = Self(0x0000_0002);
    pub const UNICODE_ON_DISK: Self = Self(0x0000_0004);
    pub const SUPPORTS_REMOTE_STORAGE: Self = Self(0x0000_0100);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FileSystemFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInformation {
    pub volume_label: String,
    pub features: FileSystemFeatures,
    pub file_system_name: String,
    pub maximum_component_length: u32,
}

/// Capacity figures reported for the volume, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskSpace {
    pub free_bytes: u64,
    pub total_bytes: u64,
    pub used_bytes: u64,
}

/// Callbacks invoked by the driver runtime.
///
/// Implementations must tolerate concurrent calls for different handles,
/// including handles opened on the same path. Calls for one handle are
/// serialized by the runtime.
pub trait DriverOperations: Send + Sync {
    fn create_file(
        &self,
        path: &str,
        access: FileAccess,
        disposition: CreateDisposition,
        info: &mut FileInfo,
    ) -> NtStatus;

    fn open_directory(&self, path: &str, info: &mut FileInfo) -> NtStatus;

    fn create_directory(&self, path: &str, info: &mut FileInfo) -> NtStatus;

    /// Last handle to the file is being closed. Performs delete-on-close.
    fn cleanup(&self, path: &str, info: &mut FileInfo) -> NtStatus;

    fn close_file(&self, path: &str, info: &mut FileInfo) -> NtStatus;

    /// Returns the status and the number of bytes placed in `buffer`.
    fn read_file(&self, path: &str, buffer: &mut [u8], offset: i64, info: &mut FileInfo) -> (NtStatus, usize);

    /// Returns the status and the number of bytes accepted.
    fn write_file(&self, path: &str, data: &[u8], offset: i64, info: &mut FileInfo) -> (NtStatus, usize);

    fn flush_file_buffers(&self, path: &str, info: &mut FileInfo) -> NtStatus;

    fn get_file_information(&self, path: &str, info: &mut FileInfo) -> (NtStatus, Option<FileInformation>);

    fn find_files(&self, path: &str, info: &mut FileInfo) -> (NtStatus, Vec<FileInformation>);

    /// Listing filtered by a `*`/`?` search pattern.
    fn find_files_with_pattern(
        &self,
        path: &str,
        pattern: &str,
        info: &mut FileInfo,
    ) -> (NtStatus, Vec<FileInformation>) {
        let (status, mut files) = self.find_files(path, info);
        files.retain(|f| path::matches_pattern(pattern, &f.file_name));
        (status, files)
    }

    fn set_file_attributes(&self, path: &str, attributes: FileAttributes, info: &mut FileInfo) -> NtStatus;

    fn set_file_time(
        &self,
        path: &str,
        creation_time: Option<SystemTime>,
        last_access_time: Option<SystemTime>,
        last_write_time: Option<SystemTime>,
        info: &mut FileInfo,
    ) -> NtStatus;

    /// Pre-check only; the deletion happens in cleanup.
    fn delete_file(&self, path: &str, info: &mut FileInfo) -> NtStatus;

    /// Pre-check only; the deletion happens in cleanup.
    fn delete_directory(&self, path: &str, info: &mut FileInfo) -> NtStatus;

    fn move_file(&self, old_path: &str, new_path: &str, replace: bool, info: &mut FileInfo) -> NtStatus;

    fn set_end_of_file(&self, path: &str, length: i64, info: &mut FileInfo) -> NtStatus;

    fn set_allocation_size(&self, path: &str, length: i64, info: &mut FileInfo) -> NtStatus;

    fn lock_file(&self, path: &str, offset: i64, length: i64, info: &mut FileInfo) -> NtStatus;

    fn unlock_file(&self, path: &str, offset: i64, length: i64, info: &mut FileInfo) -> NtStatus;

    fn get_disk_free_space(&self, info: &mut FileInfo) -> (NtStatus, DiskSpace);

    fn get_volume_information(&self, info: &mut FileInfo) -> (NtStatus, VolumeInformation);

    fn get_file_security(&self, path: &str, info: &mut FileInfo) -> NtStatus;

    fn set_file_security(&self, path: &str, descriptor: &[u8], info: &mut FileInfo) -> NtStatus;

    fn unmount(&self, info: &mut FileInfo) -> NtStatus;

    fn enumerate_named_streams(&self, path: &str, info: &mut FileInfo) -> NtStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_only_access() {
        assert!(FileAccess::READ_ATTRIBUTES.is_metadata_only());
        assert!((FileAccess::READ_ATTRIBUTES | FileAccess::READ_CONTROL | FileAccess::SYNCHRONIZE).is_metadata_only());
        assert!(FileAccess::default().is_metadata_only());
        // Delete alone does not touch content
        assert!(FileAccess::DELETE.is_metadata_only());

        assert!(!FileAccess::READ_DATA.is_metadata_only());
        assert!(!(FileAccess::GENERIC_READ | FileAccess::READ_ATTRIBUTES).is_metadata_only());
        assert!(!FileAccess::APPEND_DATA.is_metadata_only());
    }

    #[test]
    fn test_access_contains() {
        let access = FileAccess::READ_DATA | FileAccess::WRITE_DATA;
        assert!(access.contains(FileAccess::READ_DATA));
        assert!(!access.contains(FileAccess::DELETE));
        assert!(access.intersects(FileAccess::DATA_WRITE_ACCESS));
    }

    #[test]
    fn test_dispositions() {
        use CreateDisposition::*;
        assert!(Open.requires_existence());
        assert!(Truncate.requires_existence());
        assert!(!OpenOrCreate.requires_existence());
        assert!(CreateNew.forbids_existence());
        assert!(Create.truncates());
        assert!(Truncate.truncates());
        assert!(!Append.truncates());
    }

    #[test]
    fn test_context_defaults_to_none() {
        let info = FileInfo::new(42);
        assert!(info.context.is_none());
        assert!(!info.is_directory);
        assert_eq!(info.process_id, 42);
        assert!(FileInfo::directory(1).is_directory);
    }

    #[test]
    fn test_attributes() {
        assert!(FileAttributes::DIRECTORY.is_directory());
        assert!(!FileAttributes::NORMAL.is_directory());
    }
}
