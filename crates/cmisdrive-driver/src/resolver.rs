//! Path resolution against the repository.
//!
//! Every resolve is one remote round trip. Nothing is cached: callers get a
//! snapshot that may be stale by the time they act on it.

use cmisdrive_core::{RepoObject, RepoPath, RepoResult, Repository};
use cmisdrive_mount::path::to_repo_path;
use std::sync::Arc;
use tracing::trace;

/// Outcome of resolving one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Nothing exists at the path.
    Absent,
    Folder(RepoObject),
    Document(RepoObject),
}

impl Resolved {
    fn classify(object: RepoObject) -> Self {
        if object.is_folder() {
            Self::Folder(object)
        } else {
            Self::Document(object)
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn object(&self) -> Option<&RepoObject> {
        match self {
            Self::Absent => None,
            Self::Folder(object) | Self::Document(object) => Some(object),
        }
    }

    pub fn into_object(self) -> Option<RepoObject> {
        match self {
            Self::Absent => None,
            Self::Folder(object) | Self::Document(object) => Some(object),
        }
    }

    /// Short kind name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Folder(_) => "folder",
            Self::Document(_) => "document",
        }
    }
}

/// Resolves driver paths to repository objects.
#[derive(Clone)]
pub struct PathResolver {
    repo: Arc<dyn Repository>,
}

impl PathResolver {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Resolve a driver path (`\dir\file`).
    ///
    /// Absence is `Ok(Resolved::Absent)`; every other repository failure is
    /// returned as an error.
    pub fn resolve(&self, driver_path: &str) -> RepoResult<Resolved> {
        self.resolve_repo_path(&to_repo_path(driver_path))
    }

    pub fn resolve_repo_path(&self, path: &RepoPath) -> RepoResult<Resolved> {
        let resolved = match self.repo.object_by_path(path) {
            Ok(object) => Resolved::classify(object),
            Err(e) if e.is_not_found() => Resolved::Absent,
            Err(e) => return Err(e),
        };
        trace!(path = %path, kind = resolved.kind(), "resolved");
        Ok(resolved)
    }
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("repository", &self.repo.info().id)
            .finish()
    }
}
