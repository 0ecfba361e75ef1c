//! Filesystem status vocabulary returned by every driver callback.

use std::fmt;

/// Result status of a driver callback.
///
/// The set is fixed; every callback returns exactly one of these.
/// [`code`](Self::code) yields the NTSTATUS value handed back to the
/// driver runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NtStatus {
    Success,
    FileNotFound,
    PathNotFound,
    FileExists,
    AccessDenied,
    DirectoryNotEmpty,
    DiskFull,
    BufferOverflow,
    NotImplemented,
}

impl NtStatus {
    /// Raw NTSTATUS value.
    pub const fn code(self) -> u32 {
        match self {
            Self::Success => 0x0000_0000,
            Self::FileNotFound => 0xC000_0034,
            Self::PathNotFound => 0xC000_003A,
            Self::FileExists => 0xC000_0035,
            Self::AccessDenied => 0xC000_0022,
            Self::DirectoryNotEmpty => 0xC000_0101,
            Self::DiskFull => 0xC000_007F,
            Self::BufferOverflow => 0x8000_0005,
            Self::NotImplemented => 0xC000_0002,
        }
    }

    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Symbolic NTSTATUS name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "STATUS_SUCCESS",
            Self::FileNotFound => "STATUS_OBJECT_NAME_NOT_FOUND",
            Self::PathNotFound => "STATUS_OBJECT_PATH_NOT_FOUND",
            Self::FileExists => "STATUS_OBJECT_NAME_COLLISION",
            Self::AccessDenied => "STATUS_ACCESS_DENIED",
            Self::DirectoryNotEmpty => "STATUS_DIRECTORY_NOT_EMPTY",
            Self::DiskFull => "STATUS_DISK_FULL",
            Self::BufferOverflow => "STATUS_BUFFER_OVERFLOW",
            Self::NotImplemented => "STATUS_NOT_IMPLEMENTED",
        }
    }
}

impl fmt::Display for NtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.name(), self.code())
    }
}
