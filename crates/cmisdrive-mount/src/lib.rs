//! Building blocks shared by CmisDrive mount front ends.
//!
//! # Components
//!
//! - [`NtStatus`] - The fixed status vocabulary every driver callback returns
//! - [`ErrorCategory`] / [`OpKind`] - Translation of repository and staging
//!   failures into statuses, depending on the kind of call
//! - [`StagingBuffer`] - In-memory write staging for one open document
//! - [`HandleTable`] - Thread-safe open-handle management
//! - [`path`] - Driver path translation and search-pattern matching
//!
//! # Write staging
//!
//! Repository documents can only be replaced as a whole. [`StagingBuffer`]
//! provides the read-modify-write pattern:
//! 1. On first write: existing content is loaded into memory
//! 2. On write: the in-memory buffer is modified
//! 3. On flush or cleanup: the entire buffer is committed as the new content
//!
//! # Example
//!
//! ```
//! use cmisdrive_core::{ObjectId, RepoError};
//! use cmisdrive_mount::{repo_status, HandleTable, NtStatus, OpKind, StagingBuffer};
//!
//! let handles: HandleTable<StagingBuffer> = HandleTable::new();
//! let id = handles.open(StagingBuffer::truncated(ObjectId::new("doc")));
//! handles.with_mut(id, |buf| buf.write(0, b"hi")).unwrap().unwrap();
//!
//! let err = RepoError::ObjectNotFound { path: "/gone".into() };
//! assert_eq!(repo_status(&err, OpKind::Traversal), NtStatus::PathNotFound);
//! ```

mod error_category;
mod handle_table;
pub mod path;
mod staging_buffer;
mod status;

pub use error_category::{ErrorCategory, OpKind, repo_status};
pub use handle_table::{HandleId, HandleTable};
pub use staging_buffer::{DEFAULT_STAGING_LIMIT, StagingBuffer, StagingError};
pub use status::NtStatus;
