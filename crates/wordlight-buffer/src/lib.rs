//! # Wordlight Buffer
//!
//! Immutable, versioned text snapshots backed by a rope.
//!
//! ## Key Concepts
//!
//! ### Snapshots never change
//! - `TextBuffer` owns the live document and hands out `TextSnapshot`s
//! - Every edit produces a new snapshot with the next version number
//! - Old snapshots stay valid and can be read from any thread
//!
//! ### Translating across versions
//! - Each version remembers the edit that produced its successor
//! - Offsets and spans from an old snapshot can be mapped forward
//! - Edge-exclusive spans do not grow when text is inserted at their edges

mod buffer;
mod search;
mod snapshot;
mod span;
mod version;

pub use buffer::TextBuffer;
pub use search::{FindOptions, is_word_char};
pub use snapshot::{DocumentId, Line, Position, SnapshotPoint, SnapshotSpan, TextSnapshot};
pub use span::{NormalizedSpans, Span};
pub use version::{PointTrackingMode, SpanTrackingMode, TextChange};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Offset {offset} is out of bounds (length {len})")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Span {start}..{end} is invalid")]
    InvalidSpan { start: usize, end: usize },

    #[error("Snapshot belongs to document {found}, expected {expected}")]
    ForeignDocument {
        expected: DocumentId,
        found: DocumentId,
    },

    #[error("Cannot translate backwards from version {from} to {to}")]
    VersionBehind { from: u64, to: u64 },

    #[error("Version {to} is not reachable from version {from}")]
    VersionUnreachable { from: u64, to: u64 },

    #[error("Version {0} already has a successor")]
    VersionConflict(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.snapshot().is_empty());
        assert_eq!(buffer.snapshot().version(), 0);
    }

    #[test]
    fn test_edits_produce_new_versions() {
        let mut buffer = TextBuffer::from("Hello");
        let first = buffer.snapshot();

        let second = buffer.insert(5, ", World!").unwrap();
        assert_eq!(second.version(), 1);
        assert_eq!(second.text(), "Hello, World!");

        // The old snapshot is untouched
        assert_eq!(first.text(), "Hello");
        assert_eq!(first.version(), 0);
    }

    #[test]
    fn test_translate_span_after_insert_at_start() {
        let mut buffer = TextBuffer::from("let alpha = 1;");
        let v1 = buffer.snapshot();
        let v2 = buffer.insert(0, "  ").unwrap();

        let span = v1
            .translate_span(Span::new(5, 8), &v2, SpanTrackingMode::EdgeExclusive)
            .unwrap();
        assert_eq!(span, Span::new(7, 10));
    }

    #[test]
    fn test_line_operations() {
        let buffer = TextBuffer::from("Line 1\nLine 2\r\nLine 3");
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len_lines(), 3);

        let line = snapshot.line_containing(9).unwrap();
        assert_eq!(line.number, 1);
        assert_eq!(line.start, 7);
        assert_eq!(line.text, "Line 2");
    }
}
