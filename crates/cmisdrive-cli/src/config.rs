//! Configuration file.
//!
//! An optional TOML file supplies connection settings and adapter options.
//! Command-line flags and environment variables take precedence.
//!
//! ```toml
//! url = "https://ecm.example.com/alfresco/api/-default-/public/cmis/versions/1.1/browser"
//! user = "admin"
//! repository_id = "-default-"
//! mount_point = "N:\\"
//! delete_directory_policy = "require-empty"
//! volume_label = "Contracts"
//!
//! [capacity]
//! used_bytes = 500000000
//! free_bytes = 1000000000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cmisdrive_driver::{Capacity, DirectoryDeletePolicy, DriveOptions};

/// Overrides the configuration directory (used by tests).
pub const CONFIG_DIR_ENV: &str = "CMISDRIVE_CONFIG_DIR";

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacityConfig {
    pub used_bytes: Option<u64>,
    pub free_bytes: Option<u64>,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub user: Option<String>,
    pub repository_id: Option<String>,
    pub mount_point: Option<String>,
    pub delete_directory_policy: Option<DirectoryDeletePolicy>,
    pub volume_label: Option<String>,
    pub capacity: Option<CapacityConfig>,
}

impl FileConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Adapter options from the file, defaults for anything unset.
    pub fn drive_options(&self) -> DriveOptions {
        let defaults = DriveOptions::default();
        let capacity = self.capacity.unwrap_or_default();
        DriveOptions {
            delete_directory_policy: self.delete_directory_policy.unwrap_or(defaults.delete_directory_policy),
            capacity: Capacity {
                used_bytes: capacity.used_bytes.unwrap_or(defaults.capacity.used_bytes),
                free_bytes: capacity.free_bytes.unwrap_or(defaults.capacity.free_bytes),
            },
            volume_label: self.volume_label.clone(),
            ..defaults
        }
    }
}

/// Default location of the config file, if a config directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir).join(CONFIG_FILE_NAME));
    }
    ProjectDirs::from("", "", "cmisdrive").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Load the configuration.
///
/// An explicitly given file must exist. The default file is optional.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };
    tracing::debug!(path = %path.display(), "Loading config");
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    FileConfig::parse(&text, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, text: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
url = "http://localhost:8080/browser"
user = "alice"
repository_id = "repo1"
mount_point = "M:\\"
delete_directory_policy = "folder-only"
volume_label = "Docs"

[capacity]
free_bytes = 42
"#,
        );

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.url.as_deref(), Some("http://localhost:8080/browser"));
        assert_eq!(config.user.as_deref(), Some("alice"));
        assert_eq!(config.mount_point.as_deref(), Some("M:\\"));

        let options = config.drive_options();
        assert_eq!(options.delete_directory_policy, DirectoryDeletePolicy::FolderOnly);
        assert_eq!(options.capacity.free_bytes, 42);
        assert_eq!(options.capacity.used_bytes, Capacity::default().used_bytes);
        assert_eq!(options.volume_label.as_deref(), Some("Docs"));
    }

    #[test]
    fn test_empty_config_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "");
        let config = load(Some(&path)).unwrap();
        assert_eq!(config, FileConfig::default());

        let options = config.drive_options();
        assert_eq!(options.delete_directory_policy, DirectoryDeletePolicy::RequireEmpty);
        assert_eq!(options.capacity, Capacity::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "password = \"hunter2\"\n");
        assert!(matches!(load(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_bad_policy_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "delete_directory_policy = \"sometimes\"\n");
        assert!(matches!(load(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("nope.toml"));
    }
}
