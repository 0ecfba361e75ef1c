//! Repository layer for CmisDrive.
//!
//! This crate holds everything the filesystem adapter needs to know about the
//! remote side:
//!
//! - [`RepoObject`] and [`ObjectKind`]: snapshots of folders and documents
//! - [`RepoPath`]: absolute, forward-slash repository paths
//! - [`Repository`]: the outbound operation set (resolve, list, read, create,
//!   overwrite, delete, rename)
//! - [`connect`]: opens a session from [`SessionParams`]
//!
//! Two implementations ship with the crate. [`MemoryRepository`] keeps the
//! whole tree in process memory and is selected with the `memory:` URL.
//! `BrowserBindingRepository` (feature `browser`, on by default) talks to a
//! CMIS 1.1 browser binding endpoint over HTTP.
//!
//! # Example
//!
//! ```
//! use cmisdrive_core::{connect, RepoPath, SessionParams};
//! use secrecy::SecretString;
//!
//! let params = SessionParams::new("memory:", "admin", SecretString::from("admin"));
//! let repo = connect(&params)?;
//! let root = repo.object_by_path(&RepoPath::root())?;
//! let doc = repo.create_document(&root, "hello.txt", b"hi")?;
//! assert_eq!(doc.content_length(), 2);
//! # Ok::<(), cmisdrive_core::RepoError>(())
//! ```

#[cfg(feature = "browser")]
pub mod browser;
pub mod error;
pub mod memory;
pub mod object;
pub mod path;
pub mod repository;
pub mod session;

#[cfg(feature = "browser")]
pub use browser::BrowserBindingRepository;
pub use error::{RepoError, RepoOpContext, RepoResult};
pub use memory::{MemoryOp, MemoryRepository};
pub use object::{BASE_TYPE_DOCUMENT, BASE_TYPE_FOLDER, ObjectId, ObjectKind, RepoObject, RepositoryInfo};
pub use path::RepoPath;
pub use repository::{ContentStream, Repository};
pub use session::{MEMORY_URL, SessionParams, connect};
