//! Filesystem driver callbacks for CMIS repositories.
//!
//! This crate maps the callbacks of a Dokan-style user-mode filesystem
//! driver onto a CMIS repository, so folders and documents can be browsed,
//! read, written, renamed and deleted as ordinary files.
//!
//! # Features
//!
//! - Path resolution straight against the repository on every call (no cache)
//! - Offset reads over sequential content streams
//! - Per-handle write staging, committed as a whole on flush, cleanup or close
//! - Two-phase deletes: pre-check in `delete_*`, removal in `cleanup`
//! - Volume identity and capacity synthesized from repository information
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use cmisdrive_core::MemoryRepository;
//! use cmisdrive_driver::{CreateDisposition, DriveOptions, DriverHost, FileAccess};
//!
//! let host = DriverHost::new(Arc::new(MemoryRepository::new()), DriveOptions::default());
//! host.write_all("\\hello.txt", b"hello").unwrap();
//!
//! let id = host.open("\\hello.txt", FileAccess::GENERIC_READ, CreateDisposition::Open).unwrap();
//! let mut buf = [0u8; 3];
//! assert_eq!(host.read(id, &mut buf, 2).unwrap(), 3);
//! assert_eq!(&buf, b"llo");
//! host.close(id).unwrap();
//! ```

pub mod content;
pub mod filesystem;
pub mod host;
pub mod metadata;
pub mod operations;
pub mod resolver;

pub use filesystem::{CmisDrive, DirectoryDeletePolicy, DriveOptions};
pub use host::{DriverHost, HostError, HostResult};
pub use metadata::{Capacity, FALLBACK_VOLUME_LABEL};
pub use operations::{
    CreateDisposition, DiskSpace, DocumentHandle, DriverOperations, FileAccess, FileAttributes, FileInfo,
    FileInformation, FileSystemFeatures, HandleContext, VolumeInformation,
};
pub use resolver::{PathResolver, Resolved};

pub use cmisdrive_mount::{HandleId, NtStatus};
