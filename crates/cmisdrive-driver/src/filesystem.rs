//! Driver callbacks over a CMIS repository.
//!
//! [`CmisDrive`] implements [`DriverOperations`]. Each callback translates
//! the driver path, resolves it against the repository, branches on
//! existence and kind, performs at most one remote mutation, and translates
//! the outcome into an [`NtStatus`].
//!
//! Writes are staged per handle and committed on flush, cleanup or close.
//! Deletes are two-phase: `delete_file`/`delete_directory` only check, and
//! the remote deletion happens in `cleanup` when delete-on-close is set.

use crate::content::{self, MAX_READ_OFFSET};
use crate::metadata::{self, Capacity};
use crate::operations::{
    CreateDisposition, DiskSpace, DocumentHandle, DriverOperations, FileAccess, FileAttributes,
    FileInfo, FileInformation, HandleContext, VolumeInformation,
};
use crate::resolver::{PathResolver, Resolved};
use cmisdrive_core::{ObjectKind, RepoObject, RepoPath, RepoResult, Repository};
use cmisdrive_mount::path::to_repo_path;
use cmisdrive_mount::{DEFAULT_STAGING_LIMIT, NtStatus, OpKind, StagingBuffer, repo_status};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::{debug, info, instrument, trace, warn};

// Suffix source for names of destinations displaced during a replacing move
static DISPLACED_SEQ: AtomicU64 = AtomicU64::new(0);

/// How `delete_directory` decides whether a folder may be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectoryDeletePolicy {
    /// Folders with children report `DirectoryNotEmpty`.
    #[default]
    RequireEmpty,
    /// Any folder may be deleted; cleanup removes it recursively.
    FolderOnly,
}

impl DirectoryDeletePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequireEmpty => "require-empty",
            Self::FolderOnly => "folder-only",
        }
    }
}

impl fmt::Display for DirectoryDeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectoryDeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "require-empty" => Ok(Self::RequireEmpty),
            "folder-only" => Ok(Self::FolderOnly),
            other => Err(format!(
                "unknown directory delete policy '{other}' (expected require-empty or folder-only)"
            )),
        }
    }
}

/// Adapter-level options.
#[derive(Debug, Clone)]
pub struct DriveOptions {
    pub delete_directory_policy: DirectoryDeletePolicy,
    pub capacity: Capacity,
    /// Overrides the product-derived volume label.
    pub volume_label: Option<String>,
    /// Largest content one handle may stage.
    pub staging_limit: u64,
}

impl Default for DriveOptions {
    fn default() -> Self {
        Self {
            delete_directory_policy: DirectoryDeletePolicy::default(),
            capacity: Capacity::default(),
            volume_label: None,
            staging_limit: DEFAULT_STAGING_LIMIT,
        }
    }
}

/// Repository-backed implementation of the driver callbacks.
pub struct CmisDrive {
    repo: Arc<dyn Repository>,
    resolver: PathResolver,
    options: DriveOptions,
}

impl CmisDrive {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self::with_options(repo, DriveOptions::default())
    }

    pub fn with_options(repo: Arc<dyn Repository>, options: DriveOptions) -> Self {
        Self {
            resolver: PathResolver::new(Arc::clone(&repo)),
            repo,
            options,
        }
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repo
    }

    pub fn options(&self) -> &DriveOptions {
        &self.options
    }

    /// Staging buffer of a document handle, loading current content first.
    fn staging<'a>(&self, handle: &'a mut DocumentHandle) -> RepoResult<&'a mut StagingBuffer> {
        match &mut handle.staging {
            Some(staging) => Ok(staging),
            slot @ None => {
                let loaded = content::load_staging(self.repo.as_ref(), &handle.object, self.options.staging_limit)?;
                Ok(slot.insert(loaded))
            }
        }
    }

    fn commit_status(&self, handle: &mut DocumentHandle) -> NtStatus {
        match content::commit(self.repo.as_ref(), handle) {
            Ok(_) => NtStatus::Success,
            Err(e) => {
                warn!(document = %handle.object.id, error = %e, "Commit of staged content failed");
                repo_status(&e, OpKind::Staging)
            }
        }
    }

    /// Create an empty document at an absent path.
    fn create_document(&self, path: &str) -> Result<RepoObject, NtStatus> {
        let repo_path = to_repo_path(path);
        let Some((parent_path, name)) = repo_path.split_leaf() else {
            return Err(NtStatus::AccessDenied);
        };
        let parent = match self.resolver.resolve_repo_path(&parent_path) {
            Ok(Resolved::Folder(parent)) => parent,
            Ok(_) => return Err(NtStatus::PathNotFound),
            Err(e) => return Err(repo_status(&e, OpKind::Traversal)),
        };
        debug!(parent = %parent_path, name, "Creating empty document");
        self.repo
            .create_document(&parent, name, &[])
            .map_err(|e| repo_status(&e, OpKind::Mutation))
    }

    fn delete_on_close(&self, path: &str) -> NtStatus {
        let object = match self.resolver.resolve(path) {
            Ok(resolved) => match resolved.into_object() {
                Some(object) => object,
                // Already gone
                None => return NtStatus::Success,
            },
            Err(e) => return repo_status(&e, OpKind::Mutation),
        };
        debug!(path, id = %object.id, "Deleting on close");
        match self.repo.delete(&object, true) {
            Ok(()) => NtStatus::Success,
            Err(e) if e.is_not_found() => NtStatus::Success,
            Err(e) => {
                warn!(path, error = %e, "Remote delete failed");
                repo_status(&e, OpKind::Mutation)
            }
        }
    }

    fn retarget_handle(info: &mut FileInfo, renamed: RepoObject) {
        if let Some(handle) = info.context.document_mut().filter(|h| h.object.id == renamed.id) {
            handle.object = renamed;
        }
    }

    /// Rename `source` onto the path of the document `existing`.
    ///
    /// The existing document is first moved aside within its folder and only
    /// deleted once the rename succeeded. Any failure puts both objects back
    /// where they were.
    fn replace_document(
        &self,
        source: &RepoObject,
        old_path: &str,
        existing: RepoObject,
        new_path: &str,
        info: &mut FileInfo,
    ) -> NtStatus {
        let target = to_repo_path(new_path);
        let Some((parent, name)) = target.split_leaf() else {
            return NtStatus::AccessDenied;
        };
        let seq = DISPLACED_SEQ.fetch_add(1, Ordering::Relaxed);
        let aside_path = parent.join(&format!("~{name}.{}-{seq}.replaced", std::process::id()));

        debug!(dest = %target, aside = %aside_path, "Moving existing destination aside for replace");
        let aside = match self.repo.rename(&existing, &aside_path) {
            Ok(aside) => aside,
            Err(e) => {
                debug!(error = %e, "Could not move destination aside");
                return repo_status(&e, OpKind::Mutation);
            }
        };

        let renamed = match self.repo.rename(source, &target) {
            Ok(renamed) => renamed,
            Err(e) => {
                debug!(error = %e, "Rename failed, restoring destination");
                self.restore(&aside, &target);
                return repo_status(&e, OpKind::Mutation);
            }
        };

        if let Err(e) = self.repo.delete(&aside, false) {
            debug!(error = %e, "Could not delete replaced destination, rolling back");
            self.restore(&renamed, &to_repo_path(old_path));
            self.restore(&aside, &target);
            return repo_status(&e, OpKind::Mutation);
        }

        Self::retarget_handle(info, renamed);
        NtStatus::Success
    }

    fn restore(&self, object: &RepoObject, path: &RepoPath) {
        if let Err(e) = self.repo.rename(object, path) {
            warn!(error = %e, id = %object.id, path = %path, "Failed to restore object after aborted replace");
        }
    }

    /// Handle-level check shared by lock and unlock.
    fn has_document_handle(info: &FileInfo) -> NtStatus {
        if info.context.document().is_some() {
            NtStatus::Success
        } else {
            NtStatus::AccessDenied
        }
    }

    /// Existence check shared by the attribute and time setters.
    fn acknowledge_if_present(&self, path: &str) -> NtStatus {
        match self.resolver.resolve(path) {
            Ok(Resolved::Absent) => NtStatus::FileNotFound,
            Ok(_) => NtStatus::Success,
            Err(e) => repo_status(&e, OpKind::File),
        }
    }

    fn resize(&self, length: i64, info: &mut FileInfo, allocation: bool) -> NtStatus {
        let Some(handle) = info.context.document_mut() else {
            return NtStatus::AccessDenied;
        };
        let Ok(length) = u64::try_from(length) else {
            return NtStatus::DiskFull;
        };
        // Growing the allocation of unstaged content of known length changes nothing
        let known_growth = matches!(
            handle.object.kind,
            ObjectKind::Document { content_length: Some(len) } if length >= len
        );
        if allocation && handle.staging.is_none() && known_growth {
            return NtStatus::Success;
        }
        let staging = match self.staging(handle) {
            Ok(staging) => staging,
            Err(e) => return repo_status(&e, OpKind::Staging),
        };
        if allocation {
            staging.set_allocation(length);
            NtStatus::Success
        } else {
            match staging.set_len(length) {
                Ok(()) => NtStatus::Success,
                Err(_) => NtStatus::DiskFull,
            }
        }
    }
}

impl fmt::Debug for CmisDrive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmisDrive")
            .field("repository", &self.repo.info().id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn leaf_name(path: &str) -> &str {
    path.rsplit('\\').find(|s| !s.is_empty()).unwrap_or("\\")
}

impl DriverOperations for CmisDrive {
    #[instrument(level = "debug", skip(self, info), fields(path = %path))]
    fn create_file(
        &self,
        path: &str,
        access: FileAccess,
        disposition: CreateDisposition,
        info: &mut FileInfo,
    ) -> NtStatus {
        if info.is_directory {
            return match disposition {
                CreateDisposition::CreateNew | CreateDisposition::Create => self.create_directory(path, info),
                CreateDisposition::OpenOrCreate => match self.open_directory(path, info) {
                    NtStatus::PathNotFound => self.create_directory(path, info),
                    status => status,
                },
                _ => self.open_directory(path, info),
            };
        }

        let resolved = match self.resolver.resolve(path) {
            Ok(resolved) => resolved,
            Err(e) => return repo_status(&e, OpKind::File),
        };
        trace!(kind = resolved.kind(), ?disposition, access = access.bits(), "create_file");

        let status = match resolved {
            Resolved::Absent if disposition.requires_existence() => NtStatus::FileNotFound,
            Resolved::Absent => match self.create_document(path) {
                Ok(object) => {
                    let staging = StagingBuffer::load(object.id.clone(), Vec::new()).with_limit(self.options.staging_limit);
                    info.context = HandleContext::Document(DocumentHandle::with_staging(object, staging));
                    info.write_to_end_of_file |= disposition == CreateDisposition::Append;
                    NtStatus::Success
                }
                Err(status) => status,
            },
            _ if disposition.forbids_existence() => NtStatus::FileExists,
            Resolved::Folder(_) if disposition.truncates() => NtStatus::AccessDenied,
            Resolved::Folder(_) => {
                info.is_directory = true;
                info.context = HandleContext::Directory;
                NtStatus::Success
            }
            Resolved::Document(object) if disposition.truncates() => {
                let staging = StagingBuffer::truncated(object.id.clone()).with_limit(self.options.staging_limit);
                info.context = HandleContext::Document(DocumentHandle::with_staging(object, staging));
                NtStatus::Success
            }
            Resolved::Document(_) if access.is_metadata_only() => {
                info.context = HandleContext::None;
                NtStatus::Success
            }
            Resolved::Document(object) => {
                info.context = HandleContext::Document(DocumentHandle::new(object));
                info.write_to_end_of_file |= disposition == CreateDisposition::Append;
                NtStatus::Success
            }
        };
        debug!(%status, "create_file");
        status
    }

    #[instrument(level = "debug", skip(self, info), fields(path = %path))]
    fn open_directory(&self, path: &str, info: &mut FileInfo) -> NtStatus {
        let status = match self.resolver.resolve(path) {
            Ok(Resolved::Folder(_)) => {
                info.is_directory = true;
                info.context = HandleContext::Directory;
                NtStatus::Success
            }
            Ok(_) => NtStatus::PathNotFound,
            Err(e) => repo_status(&e, OpKind::Traversal),
        };
        debug!(%status, "open_directory");
        status
    }

    #[instrument(level = "debug", skip(self, info), fields(path = %path))]
    fn create_directory(&self, path: &str, info: &mut FileInfo) -> NtStatus {
        let repo_path = to_repo_path(path);
        let Some((parent_path, name)) = repo_path.split_leaf() else {
            return NtStatus::AccessDenied;
        };

        // Parent lookup and creation failures are not distinguished
        let result = self.resolver.resolve_repo_path(&parent_path).and_then(|parent| match parent {
            Resolved::Folder(parent) => self.repo.create_folder(&parent, name).map(Some),
            _ => Ok(None),
        });
        let status = match result {
            Ok(Some(folder)) => {
                debug!(id = %folder.id, "Created folder");
                info.is_directory = true;
                info.context = HandleContext::Directory;
                NtStatus::Success
            }
            Ok(None) => NtStatus::AccessDenied,
            Err(e) => {
                debug!(error = %e, "Folder creation failed");
                repo_status(&e, OpKind::OpaqueMutation)
            }
        };
        debug!(%status, "create_directory");
        status
    }

    #[instrument(level = "debug", skip(self, info), fields(path = %path, delete_on_close = info.delete_on_close))]
    fn cleanup(&self, path: &str, info: &mut FileInfo) -> NtStatus {
        let context = std::mem::take(&mut info.context);

        let status = if info.delete_on_close {
            // Staged content of a file being deleted is discarded
            drop(context);
            self.delete_on_close(path)
        } else if let HandleContext::Document(mut handle) = context {
            let status = self.commit_status(&mut handle);
            if !status.is_success() {
                // Leave the handle for close_file to retry
                info.context = HandleContext::Document(handle);
            }
            status
        } else {
            NtStatus::Success
        };
        debug!(%status, "cleanup");
        status
    }

    #[instrument(level = "debug", skip(self, info), fields(path = %path))]
    fn close_file(&self, path: &str, info: &mut FileInfo) -> NtStatus {
        let status = match std::mem::take(&mut info.context) {
            HandleContext::Document(mut handle) if handle.is_dirty() && !info.delete_on_close => {
                self.commit_status(&mut handle)
            }
            _ => NtStatus::Success,
        };
        debug!(%status, "close_file");
        status
    }

    #[instrument(level = "debug", skip(self, buffer, info), fields(path = %path, len = buffer.len()))]
    fn read_file(&self, path: &str, buffer: &mut [u8], offset: i64, info: &mut FileInfo) -> (NtStatus, usize) {
        if !(0..=MAX_READ_OFFSET).contains(&offset) {
            debug!(offset, "Read offset out of range");
            return (NtStatus::BufferOverflow, 0);
        }
        // 0 <= offset <= i32::MAX
        #[allow(clippy::cast_sign_loss)]
        let offset = offset as u64;

        if let Some(staging) = info.context.document().and_then(|h| h.staging.as_ref()) {
            let data = staging.read(offset, buffer.len());
            buffer[..data.len()].copy_from_slice(data);
            trace!(read = data.len(), "read_file from staging");
            return (NtStatus::Success, data.len());
        }

        let result = match self.resolver.resolve(path) {
            Ok(Resolved::Document(document)) => {
                content::read_document(self.repo.as_ref(), &document, offset, buffer)
                    .map_err(|e| repo_status(&e, OpKind::File))
            }
            Ok(Resolved::Folder(_)) => Err(NtStatus::AccessDenied),
            Ok(Resolved::Absent) => Err(NtStatus::FileNotFound),
            Err(e) => Err(repo_status(&e, OpKind::File)),
        };
        match result {
            Ok(read) => {
                trace!(read, "read_file");
                (NtStatus::Success, read)
            }
            Err(status) => {
                debug!(%status, "read_file");
                (status, 0)
            }
        }
    }

    #[instrument(level = "debug", skip(self, data, info), fields(path = %path, len = data.len()))]
    fn write_file(&self, path: &str, data: &[u8], offset: i64, info: &mut FileInfo) -> (NtStatus, usize) {
        let append = info.write_to_end_of_file || offset < 0;
        let Some(handle) = info.context.document_mut() else {
            debug!("write_file without a document handle");
            return (NtStatus::AccessDenied, 0);
        };
        let staging = match self.staging(handle) {
            Ok(staging) => staging,
            Err(e) => {
                warn!(error = %e, "Could not load content for staging");
                return (repo_status(&e, OpKind::Staging), 0);
            }
        };
        let result = if append {
            staging.append(data)
        } else {
            #[allow(clippy::cast_sign_loss)]
            staging.write(offset as u64, data)
        };
        match result {
            Ok(written) => {
                trace!(written, staged = staging.len(), "write_file");
                (NtStatus::Success, written)
            }
            Err(e) => {
                warn!(error = %e, "Staging write failed");
                (NtStatus::DiskFull, 0)
            }
        }
    }

    #[instrument(level = "debug", skip(self, info), fields(path = %path))]
    fn flush_file_buffers(&self, path: &str, info: &mut FileInfo) -> NtStatus {
        let status = match info.context.document_mut() {
            Some(handle) => self.commit_status(handle),
            None => NtStatus::Success,
        };
        debug!(%status, "flush_file_buffers");
        status
    }

    #[instrument(level = "debug", skip(self, info), fields(path = %path))]
    fn get_file_information(&self, path: &str, info: &mut FileInfo) -> (NtStatus, Option<FileInformation>) {
        let object = match self.resolver.resolve(path) {
            Ok(resolved) => match resolved.into_object() {
                Some(object) => object,
                None => return (NtStatus::FileNotFound, None),
            },
            Err(e) => return (repo_status(&e, OpKind::File), None),
        };
        let staged_len = info
            .context
            .document()
            .filter(|h| h.object.id == object.id)
            .and_then(|h| h.staging.as_ref())
            .map(StagingBuffer::len);
        (NtStatus::Success, Some(metadata::file_information(leaf_name(path), &object, staged_len)))
    }

    #[instrument(level = "debug", skip(self, _info), fields(path = %path))]
    fn find_files(&self, path: &str, _info: &mut FileInfo) -> (NtStatus, Vec<FileInformation>) {
        let folder = match self.resolver.resolve(path) {
            Ok(Resolved::Folder(folder)) => folder,
            Ok(_) => return (NtStatus::PathNotFound, Vec::new()),
            Err(e) => return (repo_status(&e, OpKind::Traversal), Vec::new()),
        };
        match self.repo.children(&folder) {
            Ok(children) => {
                let files: Vec<_> = children
                    .iter()
                    .map(|child| metadata::file_information(&child.name, child, None))
                    .collect();
                trace!(count = files.len(), "Directory entries found");
                (NtStatus::Success, files)
            }
            Err(e) => (repo_status(&e, OpKind::Traversal), Vec::new()),
        }
    }

    #[instrument(level = "debug", skip(self, _info), fields(path = %path))]
    fn set_file_attributes(&self, path: &str, attributes: FileAttributes, _info: &mut FileInfo) -> NtStatus {
        let status = self.acknowledge_if_present(path);
        debug!(%status, attributes = attributes.bits(), "Attributes are owned by the repository; ignored");
        status
    }

    #[instrument(level = "debug", skip(self, _info), fields(path = %path))]
    fn set_file_time(
        &self,
        path: &str,
        creation_time: Option<SystemTime>,
        _last_access_time: Option<SystemTime>,
        last_write_time: Option<SystemTime>,
        _info: &mut FileInfo,
    ) -> NtStatus {
        let status = self.acknowledge_if_present(path);
        debug!(%status, ?creation_time, ?last_write_time, "Timestamps are owned by the repository; ignored");
        status
    }

    #[instrument(level = "debug", skip(self, _info), fields(path = %path))]
    fn delete_file(&self, path: &str, _info: &mut FileInfo) -> NtStatus {
        let status = match self.resolver.resolve(path) {
            Ok(Resolved::Document(_)) => NtStatus::Success,
            Ok(_) => NtStatus::FileNotFound,
            Err(e) => repo_status(&e, OpKind::File),
        };
        debug!(%status, "delete_file");
        status
    }

    #[instrument(level = "debug", skip(self, _info), fields(path = %path, policy = %self.options.delete_directory_policy))]
    fn delete_directory(&self, path: &str, _info: &mut FileInfo) -> NtStatus {
        let status = match self.resolver.resolve(path) {
            Ok(Resolved::Folder(folder)) => match self.options.delete_directory_policy {
                DirectoryDeletePolicy::FolderOnly => NtStatus::Success,
                DirectoryDeletePolicy::RequireEmpty => match self.repo.children(&folder) {
                    Ok(children) if children.is_empty() => NtStatus::Success,
                    Ok(children) => {
                        debug!(children = children.len(), "Folder not empty");
                        NtStatus::DirectoryNotEmpty
                    }
                    Err(e) => repo_status(&e, OpKind::Traversal),
                },
            },
            Ok(_) => NtStatus::PathNotFound,
            Err(e) => repo_status(&e, OpKind::Traversal),
        };
        debug!(%status, "delete_directory");
        status
    }

    #[instrument(level = "debug", skip(self, info), fields(from = %old_path, to = %new_path))]
    fn move_file(&self, old_path: &str, new_path: &str, replace: bool, info: &mut FileInfo) -> NtStatus {
        let source = match self.resolver.resolve(old_path) {
            Ok(resolved) => match resolved.into_object() {
                Some(object) => object,
                None => return NtStatus::FileNotFound,
            },
            Err(e) => return repo_status(&e, OpKind::File),
        };

        let destination = match self.resolver.resolve(new_path) {
            Ok(resolved) => resolved,
            Err(e) => return repo_status(&e, OpKind::Mutation),
        };
        match destination {
            // Case-only renames resolve the destination to the source itself
            Resolved::Folder(ref existing) | Resolved::Document(ref existing) if existing.id == source.id => {}
            Resolved::Absent => {}
            _ if !replace => {
                debug!("Destination exists");
                return NtStatus::FileExists;
            }
            Resolved::Folder(_) => return NtStatus::AccessDenied,
            Resolved::Document(existing) => {
                let status = self.replace_document(&source, old_path, existing, new_path, info);
                debug!(%status, replace, "move_file");
                return status;
            }
        }

        let status = match self.repo.rename(&source, &to_repo_path(new_path)) {
            Ok(renamed) => {
                Self::retarget_handle(info, renamed);
                NtStatus::Success
            }
            Err(e) => {
                debug!(error = %e, "Rename failed");
                repo_status(&e, OpKind::Mutation)
            }
        };
        debug!(%status, replace, "move_file");
        status
    }

    #[instrument(level = "debug", skip(self, info), fields(path = %path))]
    fn set_end_of_file(&self, path: &str, length: i64, info: &mut FileInfo) -> NtStatus {
        let status = self.resize(length, info, false);
        debug!(%status, length, "set_end_of_file");
        status
    }

    #[instrument(level = "debug", skip(self, info), fields(path = %path))]
    fn set_allocation_size(&self, path: &str, length: i64, info: &mut FileInfo) -> NtStatus {
        let status = self.resize(length, info, true);
        debug!(%status, length, "set_allocation_size");
        status
    }

    #[instrument(level = "debug", skip(self, info), fields(path = %path))]
    fn lock_file(&self, path: &str, offset: i64, length: i64, info: &mut FileInfo) -> NtStatus {
        let status = Self::has_document_handle(info);
        debug!(%status, offset, length, "lock_file acknowledged");
        status
    }

    #[instrument(level = "debug", skip(self, info), fields(path = %path))]
    fn unlock_file(&self, path: &str, offset: i64, length: i64, info: &mut FileInfo) -> NtStatus {
        let status = Self::has_document_handle(info);
        debug!(%status, offset, length, "unlock_file acknowledged");
        status
    }

    fn get_disk_free_space(&self, _info: &mut FileInfo) -> (NtStatus, DiskSpace) {
        let space = self.options.capacity.disk_space();
        trace!(free = space.free_bytes, total = space.total_bytes, "get_disk_free_space");
        (NtStatus::Success, space)
    }

    fn get_volume_information(&self, _info: &mut FileInfo) -> (NtStatus, VolumeInformation) {
        let volume = metadata::volume_information(self.repo.info(), self.options.volume_label.as_deref());
        trace!(label = %volume.volume_label, "get_volume_information");
        (NtStatus::Success, volume)
    }

    fn get_file_security(&self, path: &str, _info: &mut FileInfo) -> NtStatus {
        trace!(path, "get_file_security not implemented");
        NtStatus::NotImplemented
    }

    fn set_file_security(&self, path: &str, descriptor: &[u8], _info: &mut FileInfo) -> NtStatus {
        trace!(path, len = descriptor.len(), "set_file_security not implemented");
        NtStatus::NotImplemented
    }

    fn unmount(&self, _info: &mut FileInfo) -> NtStatus {
        info!(repository = %self.repo.info().id, "Unmounted");
        NtStatus::Success
    }

    fn enumerate_named_streams(&self, path: &str, _info: &mut FileInfo) -> NtStatus {
        trace!(path, "enumerate_named_streams not implemented");
        NtStatus::NotImplemented
    }
}
