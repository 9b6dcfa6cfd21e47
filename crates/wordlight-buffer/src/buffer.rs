//! The live, mutable document.
//!
//! ## Learning: Ownership of the Latest Version
//!
//! `TextBuffer` is the only writer of a document's version chain. It is
//! deliberately not `Clone`: two buffers sharing a chain would both try to
//! attach a successor to the same version.
//!
//! ```rust,ignore
//! let mut buffer = TextBuffer::from("hello");
//! let before = buffer.snapshot();       // version 0, never changes
//! let after = buffer.insert(5, "!")?;   // version 1
//! assert_eq!(before.text(), "hello");
//! ```

use ropey::Rope;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::snapshot::{DocumentId, TextSnapshot};
use crate::span::Span;
use crate::version::{TextChange, VersionNode};
use crate::{BufferError, BufferResult};

/// A document that produces a new immutable snapshot on every edit.
#[derive(Debug)]
pub struct TextBuffer {
    /// The most recent snapshot
    current: TextSnapshot,

    /// Associated file path (if any)
    file_path: Option<PathBuf>,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use wordlight_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.snapshot().is_empty());
    /// ```
    pub fn new() -> Self {
        Self::from_rope(Rope::new(), None)
    }

    /// Loads a buffer from a file.
    pub fn from_file(path: impl AsRef<Path>) -> BufferResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_rope(
            Rope::from_str(&content),
            Some(path.to_path_buf()),
        ))
    }

    fn from_rope(rope: Rope, file_path: Option<PathBuf>) -> Self {
        let current = TextSnapshot::new(DocumentId::new(), Arc::new(VersionNode::new(0)), rope);
        Self { current, file_path }
    }

    /// Returns the latest snapshot.
    pub fn snapshot(&self) -> TextSnapshot {
        self.current.clone()
    }

    /// Returns the document identifier shared by all snapshots.
    pub fn document(&self) -> DocumentId {
        self.current.document()
    }

    /// Returns the associated file path, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    // ==================== Mutations ====================

    /// Inserts text at a character offset.
    pub fn insert(&mut self, offset: usize, text: &str) -> BufferResult<TextSnapshot> {
        self.replace(Span::empty(offset), text)
    }

    /// Deletes the text in a span.
    pub fn delete(&mut self, span: Span) -> BufferResult<TextSnapshot> {
        self.replace(span, "")
    }

    /// Replaces the text in a span, producing the next version.
    pub fn replace(&mut self, span: Span, text: &str) -> BufferResult<TextSnapshot> {
        if span.start > span.end {
            return Err(BufferError::InvalidSpan {
                start: span.start,
                end: span.end,
            });
        }
        if span.end > self.current.len() {
            return Err(BufferError::OffsetOutOfBounds {
                offset: span.end,
                len: self.current.len(),
            });
        }

        let mut rope = self.current.rope().clone();
        rope.remove(span.range());
        rope.insert(span.start, text);

        let change = TextChange {
            position: span.start,
            old_len: span.len(),
            new_len: text.chars().count(),
        };
        let number = self.current.version() + 1;
        let node = Arc::new(VersionNode::new(number));

        self.current
            .version_node()
            .link(change, Arc::clone(&node))
            .map_err(|_| BufferError::VersionConflict(number - 1))?;

        self.current = TextSnapshot::new(self.current.document(), node, rope);
        Ok(self.snapshot())
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self::from_rope(Rope::from_str(s), None)
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_records_change() {
        let mut buffer = TextBuffer::from("abc def");
        let v0 = buffer.snapshot();
        let v1 = buffer.replace(Span::new(4, 7), "xy").unwrap();

        assert_eq!(v1.text(), "abc xy");
        assert_eq!(v1.document(), v0.document());
        assert_eq!(
            v0.translate_point(7, &v1, crate::PointTrackingMode::Negative)
                .unwrap(),
            6
        );
    }

    #[test]
    fn test_out_of_bounds_edit_is_rejected() {
        let mut buffer = TextBuffer::from("abc");
        assert!(buffer.insert(4, "x").is_err());
        assert!(buffer.delete(Span::new(1, 9)).is_err());
        // Failed edits do not advance the version
        assert_eq!(buffer.snapshot().version(), 0);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.vsd");
        std::fs::write(&path, "dump 0x1000\n").unwrap();

        let buffer = TextBuffer::from_file(&path).unwrap();
        assert_eq!(buffer.snapshot().text(), "dump 0x1000\n");
        assert_eq!(buffer.file_path(), Some(path.as_path()));
    }
}
