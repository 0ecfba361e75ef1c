//! Write staging for repository documents.
//!
//! Repositories replace a document's content stream as a whole; there is no
//! partial-write primitive. Writes to an open document are therefore staged
//! in memory and committed as one new content stream:
//!
//! 1. On first write (unless the open truncated the file): the current
//!    remote content is loaded into the buffer
//! 2. On write/resize: the in-memory buffer is modified
//! 3. On flush or cleanup: if dirty, the whole buffer is sent to the
//!    repository in a single call

use cmisdrive_core::ObjectId;
use thiserror::Error;

/// Largest content a single handle may stage (4 GiB).
pub const DEFAULT_STAGING_LIMIT: u64 = 4 * 1024 * 1024 * 1024;

/// Local staging failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StagingError {
    #[error("staged content would grow to {requested} bytes (limit {limit})")]
    TooLarge { requested: u64, limit: u64 },
}

/// In-memory content of one open document.
///
/// # Example
///
/// ```
/// use cmisdrive_core::ObjectId;
/// use cmisdrive_mount::StagingBuffer;
///
/// let mut buf = StagingBuffer::load(ObjectId::new("doc-1"), b"Hello".to_vec());
/// assert!(!buf.is_dirty());
///
/// buf.write(5, b", World!").unwrap();
/// assert!(buf.is_dirty());
/// assert_eq!(buf.read(0, 64), b"Hello, World!");
/// ```
#[derive(Debug)]
pub struct StagingBuffer {
    content: Vec<u8>,
    /// Set by any modification, cleared by a successful commit
    dirty: bool,
    document: ObjectId,
    limit: u64,
}

impl StagingBuffer {
    /// Stage the current content of `document`. The buffer starts clean.
    pub fn load(document: ObjectId, existing: Vec<u8>) -> Self {
        Self {
            content: existing,
            dirty: false,
            document,
            limit: DEFAULT_STAGING_LIMIT,
        }
    }

    /// Stage an empty replacement for `document`.
    ///
    /// The buffer starts dirty so that the truncation is committed even when
    /// nothing is written afterwards.
    pub fn truncated(document: ObjectId) -> Self {
        Self {
            content: Vec::new(),
            dirty: true,
            document,
            limit: DEFAULT_STAGING_LIMIT,
        }
    }

    /// Override the staging size limit.
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    fn check_len(&self, requested: u64) -> Result<usize, StagingError> {
        let too_large = StagingError::TooLarge { requested, limit: self.limit };
        if requested > self.limit {
            return Err(too_large);
        }
        usize::try_from(requested).map_err(|_| too_large)
    }

    /// Write `data` at `offset`, growing the buffer as needed.
    ///
    /// A gap between the current end and `offset` is zero-filled.
    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<usize, StagingError> {
        let requested = offset.saturating_add(data.len() as u64);
        let end = self.check_len(requested)?;
        // offset <= end, so this cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        let start = offset as usize;

        if end > self.content.len() {
            self.content.resize(end, 0);
        }
        self.content[start..end].copy_from_slice(data);
        self.dirty = true;
        Ok(data.len())
    }

    /// Write `data` at the current end of the buffer.
    pub fn append(&mut self, data: &[u8]) -> Result<usize, StagingError> {
        self.write(self.len(), data)
    }

    /// Read up to `size` bytes at `offset`. Empty past the end.
    pub fn read(&self, offset: u64, size: usize) -> &[u8] {
        let Ok(start) = usize::try_from(offset) else {
            return &[];
        };
        if start >= self.content.len() {
            return &[];
        }
        let end = start.saturating_add(size).min(self.content.len());
        &self.content[start..end]
    }

    /// Set the content length, zero-extending or truncating.
    pub fn set_len(&mut self, size: u64) -> Result<(), StagingError> {
        let size = self.check_len(size)?;
        if size != self.content.len() {
            self.content.resize(size, 0);
            self.dirty = true;
        }
        Ok(())
    }

    /// Apply an allocation size: content beyond `size` is dropped, a larger
    /// allocation leaves the content as is.
    pub fn set_allocation(&mut self, size: u64) {
        if size < self.len() {
            // size < len <= usize::MAX
            #[allow(clippy::cast_possible_truncation)]
            self.content.truncate(size as usize);
            self.dirty = true;
        }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Document this buffer will be committed to.
    #[inline]
    pub fn document(&self) -> &ObjectId {
        &self.document
    }

    #[inline]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Point the buffer at a new document id.
    ///
    /// Versioning repositories may answer a commit with a new version's id.
    pub fn retarget(&mut self, document: ObjectId) {
        self.document = document;
    }

    /// Move the content out for a commit.
    ///
    /// Follow with [`commit_succeeded`](Self::commit_succeeded) or
    /// [`commit_failed`](Self::commit_failed) to put it back.
    #[inline]
    pub fn take_content_for_commit(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.content)
    }

    /// Restore content after a successful commit and mark the buffer clean.
    #[inline]
    pub fn commit_succeeded(&mut self, content: Vec<u8>) {
        self.content = content;
        self.dirty = false;
    }

    /// Restore content after a failed commit. The buffer stays dirty.
    #[inline]
    pub fn commit_failed(&mut self, content: Vec<u8>) {
        self.content = content;
        self.dirty = true;
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn apply_write(reference: &mut Vec<u8>, offset: usize, data: &[u8]) {
        let end = offset + data.len();
        if end > reference.len() {
            reference.resize(end, 0);
        }
        reference[offset..end].copy_from_slice(data);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Write(usize, Vec<u8>),
        Append(Vec<u8>),
        SetLen(usize),
        Allocate(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..200, prop::collection::vec(any::<u8>(), 0..50)).prop_map(|(o, d)| Op::Write(o, d)),
            prop::collection::vec(any::<u8>(), 0..30).prop_map(Op::Append),
            (0usize..150).prop_map(Op::SetLen),
            (0usize..150).prop_map(Op::Allocate),
        ]
    }

    proptest! {
        /// Any sequence of staging operations matches the same operations
        /// applied to a plain Vec<u8>.
        #[test]
        fn op_sequence_matches_reference(
            initial in prop::collection::vec(any::<u8>(), 0..100),
            ops in prop::collection::vec(op(), 0..25)
        ) {
            let mut buf = StagingBuffer::load(ObjectId::new("d"), initial.clone());
            let mut reference = initial;

            for op in ops {
                match op {
                    Op::Write(offset, data) => {
                        buf.write(offset as u64, &data).unwrap();
                        apply_write(&mut reference, offset, &data);
                    }
                    Op::Append(data) => {
                        buf.append(&data).unwrap();
                        let end = reference.len();
                        apply_write(&mut reference, end, &data);
                    }
                    Op::SetLen(size) => {
                        buf.set_len(size as u64).unwrap();
                        reference.resize(size, 0);
                    }
                    Op::Allocate(size) => {
                        buf.set_allocation(size as u64);
                        reference.truncate(size);
                    }
                }
            }

            prop_assert_eq!(buf.content(), reference.as_slice());
        }

        /// Reads return exactly the clamped slice of the content.
        #[test]
        fn read_returns_correct_slice(
            content in prop::collection::vec(any::<u8>(), 0..100),
            offset in 0u64..150,
            size in 0usize..100
        ) {
            let buf = StagingBuffer::load(ObjectId::new("d"), content.clone());
            let result = buf.read(offset, size);

            #[allow(clippy::cast_possible_truncation)]
            let start = offset as usize;
            if start >= content.len() {
                prop_assert!(result.is_empty());
            } else {
                let end = (start + size).min(content.len());
                prop_assert_eq!(result, &content[start..end]);
            }
        }
    }
}
