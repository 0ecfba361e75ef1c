//! Session establishment.
//!
//! A session is bound to exactly one repository for its whole lifetime.
//! Connection failures are reported to the caller; nothing here retries.

use crate::error::{RepoError, RepoResult};
use crate::memory::MemoryRepository;
use crate::repository::Repository;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::info;

/// URL scheme selecting the in-memory repository.
pub const MEMORY_URL: &str = "memory:";

/// Parameters for opening a repository session.
#[derive(Debug, Clone)]
pub struct SessionParams {
    /// Service URL (`http(s)://...` browser binding endpoint, or `memory:`)
    pub url: String,
    pub user: String,
    pub password: SecretString,
    /// Repository to bind to. The first repository offered is used when unset.
    pub repository_id: Option<String>,
}

impl SessionParams {
    pub fn new(url: impl Into<String>, user: impl Into<String>, password: SecretString) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password,
            repository_id: None,
        }
    }

    pub fn with_repository_id(mut self, repository_id: impl Into<String>) -> Self {
        self.repository_id = Some(repository_id.into());
        self
    }
}

/// Open a session for `params`.
///
/// `memory:` yields an empty [`MemoryRepository`]; `http://` and `https://`
/// URLs connect to a CMIS browser binding endpoint.
pub fn connect(params: &SessionParams) -> RepoResult<Arc<dyn Repository>> {
    let url = params.url.trim();
    if url.starts_with(MEMORY_URL) {
        info!("Opening in-memory repository");
        return Ok(Arc::new(MemoryRepository::new()));
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        return connect_http(params);
    }

    Err(RepoError::InvalidArgument {
        reason: format!("unsupported repository URL '{url}' (expected http(s):// or memory:)"),
    })
}

#[cfg(feature = "browser")]
fn connect_http(params: &SessionParams) -> RepoResult<Arc<dyn Repository>> {
    let repo = crate::browser::BrowserBindingRepository::connect(params)?;
    info!(
        url = %params.url,
        repository = %repo.info().id,
        product = %repo.info().product_name,
        "Connected to repository"
    );
    Ok(Arc::new(repo))
}

#[cfg(not(feature = "browser"))]
fn connect_http(params: &SessionParams) -> RepoResult<Arc<dyn Repository>> {
    Err(RepoError::InvalidArgument {
        reason: format!(
            "'{}' needs the browser binding client (build with the `browser` feature)",
            params.url
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::RepoPath;

    fn params(url: &str) -> SessionParams {
        SessionParams::new(url, "admin", SecretString::from("admin"))
    }

    #[test]
    fn test_memory_url_connects() {
        let repo = connect(&params("memory:")).unwrap();
        assert_eq!(repo.info().product_name, MemoryRepository::PRODUCT_NAME);
        assert!(repo.object_by_path(&RepoPath::root()).unwrap().is_folder());
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        let err = connect(&params("ftp://example.com")).err().unwrap();
        assert!(matches!(err, RepoError::InvalidArgument { .. }));
    }

    #[test]
    fn test_repository_id_builder() {
        let p = params("memory:").with_repository_id("A1");
        assert_eq!(p.repository_id.as_deref(), Some("A1"));
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let p = SessionParams::new("memory:", "admin", SecretString::from("hunter2"));
        assert!(!format!("{p:?}").contains("hunter2"));
    }
}
