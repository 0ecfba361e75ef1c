//! Content stream adapter.
//!
//! Repository content streams are sequential: there is no seek. Offset reads
//! skip `offset` bytes of a fresh stream and then fill the caller's buffer,
//! so a read at offset k costs O(k) transferred bytes. Writes never go to the
//! repository directly; they are staged and committed as a whole.

use crate::operations::DocumentHandle;
use cmisdrive_core::{ContentStream, ObjectKind, RepoError, RepoObject, RepoOpContext, RepoResult, Repository};
use cmisdrive_mount::StagingBuffer;
use std::io::{self, Read};
use tracing::debug;

/// Largest offset an offset read accepts.
pub const MAX_READ_OFFSET: i64 = i32::MAX as i64;

/// Skip `offset` bytes of `stream`, then fill `buf` as far as the stream allows.
///
/// Returns the number of bytes placed in `buf`. Short only at end of stream.
pub fn read_at<R: Read>(mut stream: R, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
    let skipped = io::copy(&mut (&mut stream).take(offset), &mut io::sink())?;
    if skipped < offset {
        return Ok(0);
    }

    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn stream_error(source: io::Error, document: &RepoObject) -> RepoError {
    RepoError::Io {
        source,
        context: RepoOpContext::new()
            .with_operation("getContentStream")
            .with_object_id(document.id.as_str()),
    }
}

/// Open a document's content. `None` for a document without content: one
/// reported as zero-length is not fetched at all.
fn open_content(repo: &dyn Repository, document: &RepoObject) -> RepoResult<Option<ContentStream>> {
    if matches!(document.kind, ObjectKind::Document { content_length: Some(0) }) {
        return Ok(None);
    }
    match repo.content_stream(document) {
        Ok(stream) => Ok(Some(stream)),
        Err(RepoError::NoContentStream { .. }) => {
            debug!(document = %document.id, "No content stream, treating as empty");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Read from a document's remote content at `offset`.
pub fn read_document(
    repo: &dyn Repository,
    document: &RepoObject,
    offset: u64,
    buf: &mut [u8],
) -> RepoResult<usize> {
    let Some(stream) = open_content(repo, document)? else {
        return Ok(0);
    };
    read_at(stream, offset, buf).map_err(|e| stream_error(e, document))
}

/// Load a document's whole content into a fresh staging buffer.
pub fn load_staging(
    repo: &dyn Repository,
    document: &RepoObject,
    limit: u64,
) -> RepoResult<StagingBuffer> {
    let mut content = Vec::new();
    if let Some(mut stream) = open_content(repo, document)? {
        stream
            .read_to_end(&mut content)
            .map_err(|e| stream_error(e, document))?;
    }
    debug!(document = %document.id, size = content.len(), "Loaded content for staging");
    Ok(StagingBuffer::load(document.id.clone(), content).with_limit(limit))
}

/// Commit a handle's dirty staging buffer as the document's new content.
///
/// Returns `Ok(true)` when content was sent. On failure the buffer keeps its
/// content and stays dirty; the remote content is whatever the repository
/// had before the call.
pub fn commit(repo: &dyn Repository, handle: &mut DocumentHandle) -> RepoResult<bool> {
    let Some(staging) = handle.staging.as_mut().filter(|s| s.is_dirty()) else {
        return Ok(false);
    };

    let content = staging.take_content_for_commit();
    debug!(document = %handle.object.id, size = content.len(), "Committing staged content");
    match repo.set_content_stream(&handle.object, &content) {
        Ok(updated) => {
            staging.commit_succeeded(content);
            staging.retarget(updated.id.clone());
            handle.object = updated;
            Ok(true)
        }
        Err(e) => {
            staging.commit_failed(content);
            Err(e)
        }
    }
}
