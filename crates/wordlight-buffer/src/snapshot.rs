//! Immutable text snapshots.
//!
//! ## Learning: Cheap Clones
//!
//! `ropey::Rope` shares its chunks behind reference counts, so cloning a
//! rope is O(1) and both copies stay independent afterwards. A
//! `TextSnapshot` is a rope plus a pointer into the version chain, which
//! makes it cheap to hand to background threads.

use ropey::Rope;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::span::Span;
use crate::version::{PointTrackingMode, SpanTrackingMode, TextChange, VersionNode};
use crate::{BufferError, BufferResult};

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new unique document ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line/column position, both 0-indexed, columns in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display as 1-indexed for user-facing output
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A line of a snapshot, without its line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line number (0-indexed)
    pub number: usize,
    /// Offset of the first character of the line
    pub start: usize,
    /// Line content, line break excluded
    pub text: String,
}

impl Line {
    /// Offset just past the last character (before the line break).
    pub fn end(&self) -> usize {
        self.start + self.text.chars().count()
    }
}

/// An immutable view of a document at one version.
#[derive(Clone)]
pub struct TextSnapshot {
    document: DocumentId,
    version: Arc<VersionNode>,
    rope: Rope,
}

impl TextSnapshot {
    pub(crate) fn new(document: DocumentId, version: Arc<VersionNode>, rope: Rope) -> Self {
        Self {
            document,
            version,
            rope,
        }
    }

    pub(crate) fn version_node(&self) -> &Arc<VersionNode> {
        &self.version
    }

    pub(crate) fn rope(&self) -> &Rope {
        &self.rope
    }

    /// The document this snapshot belongs to.
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Monotonic version number within the document.
    pub fn version(&self) -> u64 {
        self.version.number()
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Number of lines. An empty snapshot has 1 line.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The span covering the whole snapshot.
    pub fn full_span(&self) -> SnapshotSpan {
        SnapshotSpan::new(self.clone(), Span::new(0, self.len()))
    }

    /// Returns the text of a span.
    pub fn slice(&self, span: Span) -> BufferResult<String> {
        if span.start > span.end {
            return Err(BufferError::InvalidSpan {
                start: span.start,
                end: span.end,
            });
        }
        self.check_offset(span.end)?;
        Ok(self.rope.slice(span.range()).to_string())
    }

    /// Returns the character at an offset.
    pub fn char_at(&self, offset: usize) -> BufferResult<char> {
        if offset >= self.len() {
            return Err(BufferError::OffsetOutOfBounds {
                offset,
                len: self.len(),
            });
        }
        Ok(self.rope.char(offset))
    }

    /// Returns the line containing an offset.
    ///
    /// An offset equal to the snapshot length belongs to the last line.
    pub fn line_containing(&self, offset: usize) -> BufferResult<Line> {
        self.check_offset(offset)?;

        let number = self.rope.char_to_line(offset);
        let start = self.rope.line_to_char(number);
        let slice = self.rope.line(number);
        let content_len = slice.len_chars() - line_break_len(&slice);

        Ok(Line {
            number,
            start,
            text: slice.slice(..content_len).to_string(),
        })
    }

    /// Converts a line/column position to a character offset.
    pub fn position_to_offset(&self, pos: Position) -> BufferResult<usize> {
        if pos.line >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        let line = self.rope.line(pos.line);
        let line_len = line.len_chars() - line_break_len(&line);

        // Allow column to be at end of line
        if pos.column > line_len {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        Ok(self.rope.line_to_char(pos.line) + pos.column)
    }

    /// Converts a character offset to a line/column position.
    pub fn offset_to_position(&self, offset: usize) -> BufferResult<Position> {
        self.check_offset(offset)?;
        let line = self.rope.char_to_line(offset);
        Ok(Position::new(line, offset - self.rope.line_to_char(line)))
    }

    /// Maps an offset in this snapshot to the equivalent offset in `target`.
    pub fn translate_point(
        &self,
        offset: usize,
        target: &TextSnapshot,
        mode: PointTrackingMode,
    ) -> BufferResult<usize> {
        self.check_offset(offset)?;
        Ok(self
            .changes_to(target)?
            .iter()
            .fold(offset, |offset, change| change.map_point(offset, mode)))
    }

    /// Maps a span in this snapshot to the equivalent span in `target`.
    pub fn translate_span(
        &self,
        span: Span,
        target: &TextSnapshot,
        mode: SpanTrackingMode,
    ) -> BufferResult<Span> {
        self.check_offset(span.end)?;
        Ok(self
            .changes_to(target)?
            .iter()
            .fold(span, |span, change| change.map_span(span, mode)))
    }

    /// Collects the changes leading from this version to `target`.
    fn changes_to(&self, target: &TextSnapshot) -> BufferResult<Vec<TextChange>> {
        if target.document != self.document {
            return Err(BufferError::ForeignDocument {
                expected: self.document,
                found: target.document,
            });
        }

        let (from, to) = (self.version(), target.version());
        if to < from {
            return Err(BufferError::VersionBehind { from, to });
        }

        let mut changes = Vec::with_capacity((to - from) as usize);
        let mut node = &self.version;
        while node.number() < to {
            let link = node
                .next()
                .ok_or(BufferError::VersionUnreachable { from, to })?;
            changes.push(link.change);
            node = &link.node;
        }

        Ok(changes)
    }

    fn check_offset(&self, offset: usize) -> BufferResult<()> {
        if offset > self.len() {
            return Err(BufferError::OffsetOutOfBounds {
                offset,
                len: self.len(),
            });
        }
        Ok(())
    }
}

impl PartialEq for TextSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document && self.version() == other.version()
    }
}

impl Eq for TextSnapshot {}

impl std::fmt::Debug for TextSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSnapshot")
            .field("document", &self.document)
            .field("version", &self.version())
            .field("len", &self.len())
            .finish()
    }
}

/// Number of trailing line-break characters in a rope line.
fn line_break_len(line: &ropey::RopeSlice<'_>) -> usize {
    let len = line.len_chars();
    if len == 0 {
        return 0;
    }
    match line.char(len - 1) {
        '\n' if len >= 2 && line.char(len - 2) == '\r' => 2,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}' => 1,
        _ => 0,
    }
}

/// A span tied to the snapshot it was measured against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSpan {
    pub snapshot: TextSnapshot,
    pub span: Span,
}

impl SnapshotSpan {
    pub fn new(snapshot: TextSnapshot, span: Span) -> Self {
        Self { snapshot, span }
    }

    /// The covered text.
    pub fn text(&self) -> BufferResult<String> {
        self.snapshot.slice(self.span)
    }

    /// Maps the span onto a newer snapshot of the same document.
    pub fn translate_to(
        &self,
        target: &TextSnapshot,
        mode: SpanTrackingMode,
    ) -> BufferResult<SnapshotSpan> {
        let span = self.snapshot.translate_span(self.span, target, mode)?;
        Ok(SnapshotSpan::new(target.clone(), span))
    }
}

/// A character offset tied to a snapshot, typically the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPoint {
    pub snapshot: TextSnapshot,
    pub offset: usize,
}

impl SnapshotPoint {
    /// Creates a point, checking the offset against the snapshot.
    pub fn new(snapshot: TextSnapshot, offset: usize) -> BufferResult<Self> {
        snapshot.check_offset(offset)?;
        Ok(Self { snapshot, offset })
    }

    /// Returns true if this point is the first offset of its line.
    pub fn is_line_start(&self) -> bool {
        let line = self.snapshot.rope.char_to_line(self.offset);
        self.snapshot.rope.line_to_char(line) == self.offset
    }

    /// The point one character earlier, if any.
    pub fn previous(&self) -> Option<SnapshotPoint> {
        self.offset.checked_sub(1).map(|offset| SnapshotPoint {
            snapshot: self.snapshot.clone(),
            offset,
        })
    }

    /// The character just before this point.
    pub fn char_before(&self) -> Option<char> {
        self.offset
            .checked_sub(1)
            .map(|offset| self.snapshot.rope.char(offset))
    }
}
