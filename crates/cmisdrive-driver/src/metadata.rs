//! Attribute records synthesized from repository objects.

use crate::operations::{DiskSpace, FileAttributes, FileInformation, FileSystemFeatures, VolumeInformation};
use cmisdrive_core::{RepoObject, RepositoryInfo};

/// Label used when the repository reports no product name.
pub const FALLBACK_VOLUME_LABEL: &str = "CMIS_DRIVE";

/// Capacity figures reported for the volume.
///
/// Repositories have no quota concept, so these are configured values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub used_bytes: u64,
    pub free_bytes: u64,
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            used_bytes: 500 * 1000 * 1000,
            free_bytes: 1000 * 1000 * 1000,
        }
    }
}

impl Capacity {
    pub fn disk_space(&self) -> DiskSpace {
        DiskSpace {
            free_bytes: self.free_bytes,
            total_bytes: self.used_bytes.saturating_add(self.free_bytes),
            used_bytes: self.used_bytes,
        }
    }
}

/// Build the attribute record for `object`, listed under `file_name`.
///
/// `staged_len` overrides the reported content length while an open handle
/// holds uncommitted content.
pub fn file_information(file_name: &str, object: &RepoObject, staged_len: Option<u64>) -> FileInformation {
    let (attributes, length) = if object.is_folder() {
        (FileAttributes::DIRECTORY, 0)
    } else {
        (FileAttributes::NORMAL, staged_len.unwrap_or_else(|| object.content_length()))
    };
    FileInformation {
        file_name: file_name.to_string(),
        attributes,
        creation_time: object.created,
        // Repositories do not track access times
        last_access_time: object.modified,
        last_write_time: object.modified,
        length,
    }
}

/// Volume identity derived from the repository product.
pub fn volume_information(repo: &RepositoryInfo, label_override: Option<&str>) -> VolumeInformation {
    let label = label_override
        .filter(|l| !l.is_empty())
        .or(Some(repo.product_name.as_str()).filter(|l| !l.is_empty()))
        .unwrap_or(FALLBACK_VOLUME_LABEL)
        .to_string();
    VolumeInformation {
        file_system_name: label.clone(),
        volume_label: label,
        features: FileSystemFeatures::CASE_PRESERVED_NAMES
            | FileSystemFeatures::CASE_SENSITIVE_SEARCH
            | FileSystemFeatures::SUPPORTS_REMOTE_STORAGE
            | FileSystemFeatures::UNICODE_ON_DISK,
        maximum_component_length: 255,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmisdrive_core::{ObjectId, ObjectKind};
    use std::time::{Duration, UNIX_EPOCH};

    fn object(kind: ObjectKind) -> RepoObject {
        RepoObject {
            id: ObjectId::new("1"),
            name: "x".to_string(),
            kind,
            created: Some(UNIX_EPOCH + Duration::from_secs(100)),
            modified: Some(UNIX_EPOCH + Duration::from_secs(200)),
            parent_id: None,
        }
    }

    fn repo_info(product: &str) -> RepositoryInfo {
        RepositoryInfo {
            id: "r".into(),
            name: "r".into(),
            product_name: product.into(),
            vendor_name: "v".into(),
            root_folder_id: ObjectId::new("root"),
        }
    }

    #[test]
    fn test_document_information_uses_real_times() {
        let info = file_information("a.txt", &object(ObjectKind::Document { content_length: Some(7) }), None);
        assert_eq!(info.attributes, FileAttributes::NORMAL);
        assert_eq!(info.length, 7);
        assert_eq!(info.creation_time, Some(UNIX_EPOCH + Duration::from_secs(100)));
        assert_eq!(info.last_write_time, Some(UNIX_EPOCH + Duration::from_secs(200)));
        assert_eq!(info.last_access_time, info.last_write_time);
    }

    #[test]
    fn test_unknown_length_is_zero() {
        let info = file_information("a", &object(ObjectKind::Document { content_length: None }), None);
        assert_eq!(info.length, 0);
    }

    #[test]
    fn test_staged_length_wins() {
        let info = file_information("a", &object(ObjectKind::Document { content_length: Some(7) }), Some(42));
        assert_eq!(info.length, 42);
    }

    #[test]
    fn test_folder_information() {
        let info = file_information("dir", &object(ObjectKind::Folder), Some(42));
        assert!(info.attributes.is_directory());
        assert_eq!(info.length, 0);
    }

    #[test]
    fn test_volume_label_sources() {
        assert_eq!(volume_information(&repo_info("Alfresco"), None).volume_label, "Alfresco");
        assert_eq!(volume_information(&repo_info("Alfresco"), Some("Docs")).volume_label, "Docs");
        assert_eq!(volume_information(&repo_info(""), None).volume_label, FALLBACK_VOLUME_LABEL);
        assert_eq!(volume_information(&repo_info(""), Some("")).volume_label, FALLBACK_VOLUME_LABEL);
    }

    #[test]
    fn test_volume_features() {
        let volume = volume_information(&repo_info("p"), None);
        assert_eq!(volume.file_system_name, "p");
        assert!(volume.features.contains(FileSystemFeatures::SUPPORTS_REMOTE_STORAGE));
        assert_eq!(volume.features.bits(), 0x0000_0107);
    }

    #[test]
    fn test_default_capacity() {
        let space = Capacity::default().disk_space();
        assert_eq!(space.used_bytes, 500_000_000);
        assert_eq!(space.free_bytes, 1_000_000_000);
        assert_eq!(space.total_bytes, 1_500_000_000);
    }
}
