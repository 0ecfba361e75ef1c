//! The remote repository interface.
//!
//! This is the small, synchronous operation set the filesystem adapter needs
//! from a content-management repository. Every method performs at most one
//! remote attempt and blocks for the round trip; retries and timeouts belong
//! to the implementation's transport, not to callers.

use crate::error::RepoResult;
use crate::object::{RepoObject, RepositoryInfo};
use crate::path::RepoPath;
use std::io::Read;

/// A sequential, non-seekable content stream.
pub type ContentStream = Box<dyn Read + Send>;

/// A session with a remote document repository.
///
/// Implementations must be shareable between the driver runtime's worker
/// threads. They carry no cache: every call reflects the repository's state
/// at the time of the call.
pub trait Repository: Send + Sync {
    /// Identity of the repository this session is bound to.
    fn info(&self) -> &RepositoryInfo;

    /// Resolve an object by path.
    ///
    /// Absence is reported as [`RepoError::ObjectNotFound`](crate::RepoError::ObjectNotFound).
    fn object_by_path(&self, path: &RepoPath) -> RepoResult<RepoObject>;

    /// List the direct children of a folder.
    fn children(&self, folder: &RepoObject) -> RepoResult<Vec<RepoObject>>;

    /// Open the content stream of a document.
    fn content_stream(&self, document: &RepoObject) -> RepoResult<ContentStream>;

    /// Create a folder named `name` inside `parent`.
    fn create_folder(&self, parent: &RepoObject, name: &str) -> RepoResult<RepoObject>;

    /// Create a document named `name` inside `parent` with initial content.
    fn create_document(
        &self,
        parent: &RepoObject,
        name: &str,
        content: &[u8],
    ) -> RepoResult<RepoObject>;

    /// Replace the whole content stream of a document.
    ///
    /// Either the new content becomes visible in full or the previous content
    /// is left untouched.
    fn set_content_stream(&self, document: &RepoObject, content: &[u8]) -> RepoResult<RepoObject>;

    /// Delete an object. Folders with children require `recursive`.
    fn delete(&self, object: &RepoObject, recursive: bool) -> RepoResult<()>;

    /// Move and/or rename an object to `new_path`.
    fn rename(&self, object: &RepoObject, new_path: &RepoPath) -> RepoResult<RepoObject>;
}
