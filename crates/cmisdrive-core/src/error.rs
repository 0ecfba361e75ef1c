//! Error types for repository operations.
//!
//! Every remote call returns [`RepoResult`]. Absence of an object is an
//! ordinary error variant ([`RepoError::ObjectNotFound`]) so that callers can
//! distinguish "resolved to nothing" from a transport or repository fault.

use thiserror::Error;

/// Context for repository operations, providing debugging information.
#[derive(Debug, Clone, Default)]
pub struct RepoOpContext {
    /// The repository operation being performed (e.g. `createFolder`)
    pub operation: Option<&'static str>,
    /// The repository path being operated on
    pub path: Option<String>,
    /// The object id being operated on
    pub object_id: Option<String>,
}

impl RepoOpContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(mut self, operation: &'static str) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_object_id(mut self, id: impl Into<String>) -> Self {
        self.object_id = Some(id.into());
        self
    }
}

impl std::fmt::Display for RepoOpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();

        if let Some(op) = self.operation {
            parts.push(format!("during {op}"));
        }
        if let Some(ref path) = self.path {
            parts.push(format!("path '{path}'"));
        }
        if let Some(ref id) = self.object_id {
            let display_id = if id.chars().count() > 16 {
                format!("{}...", id.chars().take(16).collect::<String>())
            } else {
                id.clone()
            };
            parts.push(format!("object {display_id}"));
        }

        if parts.is_empty() {
            write!(f, "(no context)")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Errors reported by a [`Repository`](crate::Repository).
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Object not found: '{path}'")]
    ObjectNotFound { path: String },

    #[error("Name '{name}' already exists {context}")]
    NameConflict { name: String, context: RepoOpContext },

    #[error("Expected folder {context}")]
    NotAFolder { context: RepoOpContext },

    #[error("Expected document {context}")]
    NotADocument { context: RepoOpContext },

    #[error("Document has no content stream {context}")]
    NoContentStream { context: RepoOpContext },

    #[error("Folder is not empty {context}")]
    FolderNotEmpty { context: RepoOpContext },

    #[error("Permission denied {context}")]
    PermissionDenied { context: RepoOpContext },

    #[error("Authentication failed for user '{user}'")]
    Unauthorized { user: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Transport error talking to '{url}': {reason}")]
    Transport { url: String, reason: String },

    #[error("Malformed repository response {context}: {reason}")]
    Protocol { reason: String, context: RepoOpContext },

    #[error("Repository fault {context}: {reason}")]
    Runtime { reason: String, context: RepoOpContext },

    #[error("IO error {context}: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        context: RepoOpContext,
    },
}

impl RepoError {
    /// Returns true if the error means the addressed object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::ObjectNotFound { .. })
    }

    /// Returns true for session-level failures (unreachable endpoint, bad
    /// credentials). These abort a mount instead of being mapped per call.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RepoError::Transport { .. } | RepoError::Unauthorized { .. }
        )
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        RepoError::ObjectNotFound { path: path.into() }
    }
}

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;
