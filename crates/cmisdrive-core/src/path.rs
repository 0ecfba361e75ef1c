//! Repository paths.
//!
//! Driver paths use backslash separators; repository paths use forward
//! slashes. Translation replaces separators and nothing else: case and
//! trailing separators are left for the repository's own path resolution.

use std::fmt;

/// An absolute, forward-slash separated repository path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoPath(String);

impl RepoPath {
    /// The repository root folder.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Create a repository path from an already forward-slash separated string.
    ///
    /// A missing leading slash is added; an empty string is the root.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.is_empty() {
            Self::root()
        } else if path.starts_with('/') {
            Self(path)
        } else {
            Self(format!("/{path}"))
        }
    }

    /// Translate a driver-native path (`\dir\file.txt`) to a repository path.
    pub fn from_driver_path(driver_path: &str) -> Self {
        Self::new(driver_path.replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Split into parent path and leaf name.
    ///
    /// Returns `None` for the root, which has no parent.
    pub fn split_leaf(&self) -> Option<(RepoPath, &str)> {
        if self.is_root() {
            return None;
        }
        let idx = self.0.rfind('/')?;
        let leaf = &self.0[idx + 1..];
        let parent = if idx == 0 {
            RepoPath::root()
        } else {
            RepoPath(self.0[..idx].to_string())
        };
        Some((parent, leaf))
    }

    /// Leaf name, or `""` for the root.
    pub fn leaf(&self) -> &str {
        self.split_leaf().map_or("", |(_, leaf)| leaf)
    }

    /// Path of a child entry.
    pub fn join(&self, name: &str) -> RepoPath {
        if self.0.ends_with('/') {
            RepoPath(format!("{}{name}", self.0))
        } else {
            RepoPath(format!("{}/{name}", self.0))
        }
    }

    /// Path segments, skipping empty ones.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RepoPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
