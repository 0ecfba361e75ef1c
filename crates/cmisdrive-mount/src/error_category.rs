//! Error category mapping for repository and staging errors.
//!
//! A failed repository call or staging operation is first reduced to an
//! [`ErrorCategory`]. The status a callback returns then depends on both the
//! category and the kind of call that failed ([`OpKind`]): the same
//! "object not found" is `FileNotFound` for a file call but `PathNotFound`
//! when a directory is being traversed.

use crate::staging_buffer::StagingError;
use crate::status::NtStatus;
use cmisdrive_core::RepoError;
use std::io;

/// Semantic category for adapter errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The addressed object does not exist
    NotFound,
    /// An object with the same name already exists
    AlreadyExists,
    /// Folder still has children
    NotEmpty,
    /// Expected a folder
    NotAFolder,
    /// Expected a document
    NotADocument,
    /// Repository refused the operation
    PermissionDenied,
    /// Invalid name or argument
    InvalidArgument,
    /// Any other repository fault (opaque to the adapter)
    RemoteFault,
    /// Session-level failure: endpoint unreachable or credentials rejected
    Transport,
    /// Local staging buffer failure
    LocalIo,
    /// Operation not supported
    NotSupported,
}

/// Kind of call an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Calls addressing a single file (open, read, attribute queries)
    File,
    /// Calls walking a directory (open directory, listing, delete directory)
    Traversal,
    /// Remote mutations (create, delete, rename, commit of a new document)
    Mutation,
    /// Remote mutations whose failures are not distinguished at all
    OpaqueMutation,
    /// Local staging buffer operations, including loading the buffer
    Staging,
}

impl ErrorCategory {
    /// Translate this category into the status for a call of kind `op`.
    pub fn to_status(self, op: OpKind) -> NtStatus {
        match op {
            OpKind::Staging => NtStatus::DiskFull,
            OpKind::OpaqueMutation => NtStatus::AccessDenied,
            OpKind::File => match self {
                Self::NotFound => NtStatus::FileNotFound,
                Self::AlreadyExists => NtStatus::FileExists,
                Self::NotEmpty => NtStatus::DirectoryNotEmpty,
                Self::NotSupported => NtStatus::NotImplemented,
                _ => NtStatus::AccessDenied,
            },
            OpKind::Traversal => match self {
                Self::NotFound | Self::NotAFolder => NtStatus::PathNotFound,
                Self::NotEmpty => NtStatus::DirectoryNotEmpty,
                Self::NotSupported => NtStatus::NotImplemented,
                _ => NtStatus::AccessDenied,
            },
            OpKind::Mutation => match self {
                Self::NotFound => NtStatus::PathNotFound,
                Self::AlreadyExists => NtStatus::FileExists,
                Self::NotEmpty => NtStatus::DirectoryNotEmpty,
                _ => NtStatus::AccessDenied,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::NotEmpty => "NotEmpty",
            Self::NotAFolder => "NotAFolder",
            Self::NotADocument => "NotADocument",
            Self::PermissionDenied => "PermissionDenied",
            Self::InvalidArgument => "InvalidArgument",
            Self::RemoteFault => "RemoteFault",
            Self::Transport => "Transport",
            Self::LocalIo => "LocalIo",
            Self::NotSupported => "NotSupported",
        }
    }
}

impl From<&RepoError> for ErrorCategory {
    fn from(e: &RepoError) -> Self {
        match e {
            RepoError::ObjectNotFound { .. } => Self::NotFound,
            RepoError::NameConflict { .. } => Self::AlreadyExists,
            RepoError::FolderNotEmpty { .. } => Self::NotEmpty,
            RepoError::NotAFolder { .. } => Self::NotAFolder,
            RepoError::NotADocument { .. } | RepoError::NoContentStream { .. } => Self::NotADocument,
            RepoError::PermissionDenied { .. } => Self::PermissionDenied,
            RepoError::InvalidArgument { .. } => Self::InvalidArgument,
            RepoError::Transport { .. } | RepoError::Unauthorized { .. } => Self::Transport,
            RepoError::Protocol { .. } | RepoError::Runtime { .. } => Self::RemoteFault,
            // Reading a content stream that breaks off mid-way is a remote fault too
            RepoError::Io { .. } => Self::RemoteFault,
        }
    }
}

impl From<RepoError> for ErrorCategory {
    fn from(e: RepoError) -> Self {
        Self::from(&e)
    }
}

impl From<&StagingError> for ErrorCategory {
    fn from(_: &StagingError) -> Self {
        Self::LocalIo
    }
}

impl From<&io::Error> for ErrorCategory {
    fn from(e: &io::Error) -> Self {
        io_error_category(e)
    }
}

impl From<io::Error> for ErrorCategory {
    fn from(e: io::Error) -> Self {
        io_error_category(&e)
    }
}

fn io_error_category(e: &io::Error) -> ErrorCategory {
    match e.kind() {
        io::ErrorKind::NotFound => ErrorCategory::NotFound,
        io::ErrorKind::PermissionDenied => ErrorCategory::PermissionDenied,
        io::ErrorKind::AlreadyExists => ErrorCategory::AlreadyExists,
        io::ErrorKind::DirectoryNotEmpty => ErrorCategory::NotEmpty,
        io::ErrorKind::InvalidInput => ErrorCategory::InvalidArgument,
        io::ErrorKind::Unsupported => ErrorCategory::NotSupported,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::TimedOut => ErrorCategory::Transport,
        _ => ErrorCategory::LocalIo,
    }
}

/// Translate a repository error for a call of kind `op`.
#[inline]
pub fn repo_status(e: &RepoError, op: OpKind) -> NtStatus {
    ErrorCategory::from(e).to_status(op)
}
