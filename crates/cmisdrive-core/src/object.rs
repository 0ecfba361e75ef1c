//! Repository object model.
//!
//! A [`RepoObject`] is a snapshot of a remote object taken by a single
//! resolve call. It is never mutated in place: renames, deletes and content
//! updates are new remote operations that return fresh snapshots.

use std::fmt;
use std::time::SystemTime;

/// Base type id of container objects.
pub const BASE_TYPE_FOLDER: &str = "cmis:folder";
/// Base type id of content objects.
pub const BASE_TYPE_DOCUMENT: &str = "cmis:document";

/// Opaque repository object identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discriminated kind of a repository object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Has children, no content stream.
    Folder,
    /// Has a content stream. The repository may not report its length.
    Document {
        /// Length of the content stream in bytes, if known.
        content_length: Option<u64>,
    },
}

impl ObjectKind {
    /// Classify an object by its base type id.
    ///
    /// Only container semantics make a folder; anything else that resolves
    /// (documents, items, policies, ...) is treated as a document.
    pub fn from_base_type(base_type_id: &str, content_length: Option<u64>) -> Self {
        if base_type_id == BASE_TYPE_FOLDER {
            ObjectKind::Folder
        } else {
            ObjectKind::Document { content_length }
        }
    }

    #[inline]
    pub fn is_folder(&self) -> bool {
        matches!(self, ObjectKind::Folder)
    }

    #[inline]
    pub fn is_document(&self) -> bool {
        matches!(self, ObjectKind::Document { .. })
    }
}

/// A resolved repository object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoObject {
    /// Repository object id.
    pub id: ObjectId,
    /// Display name (`cmis:name`).
    pub name: String,
    /// Folder or document.
    pub kind: ObjectKind,
    /// Creation time, if reported.
    pub created: Option<SystemTime>,
    /// Last modification time, if reported.
    pub modified: Option<SystemTime>,
    /// Parent folder id (absent for the root folder).
    pub parent_id: Option<ObjectId>,
}

impl RepoObject {
    #[inline]
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    #[inline]
    pub fn is_document(&self) -> bool {
        self.kind.is_document()
    }

    /// Content length for documents; 0 for folders and unknown lengths.
    pub fn content_length(&self) -> u64 {
        match self.kind {
            ObjectKind::Document { content_length } => content_length.unwrap_or(0),
            ObjectKind::Folder => 0,
        }
    }
}

/// Identity of the repository a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub id: String,
    pub name: String,
    pub product_name: String,
    pub vendor_name: String,
    pub root_folder_id: ObjectId,
}
