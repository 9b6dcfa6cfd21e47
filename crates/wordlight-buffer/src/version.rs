//! Version chain linking each snapshot to its successor.
//!
//! ## Learning: Write-once Links
//!
//! A version node is created without a successor. When the buffer applies
//! the next edit it fills the node's `OnceLock` with the change and the new
//! node. After that the link never changes, so any thread holding an old
//! snapshot can walk forward without locking.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

use crate::span::Span;

/// A single replacement: `old_len` characters at `position` became
/// `new_len` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChange {
    /// Character offset where the edit occurred
    pub position: usize,
    /// Number of characters removed
    pub old_len: usize,
    /// Number of characters inserted
    pub new_len: usize,
}

impl TextChange {
    pub fn insert(position: usize, len: usize) -> Self {
        Self {
            position,
            old_len: 0,
            new_len: len,
        }
    }

    pub fn delete(position: usize, len: usize) -> Self {
        Self {
            position,
            old_len: len,
            new_len: 0,
        }
    }

    fn old_end(&self) -> usize {
        self.position + self.old_len
    }

    /// Maps an offset from before this change to after it.
    pub fn map_point(&self, offset: usize, mode: PointTrackingMode) -> usize {
        if offset < self.position {
            return offset;
        }
        if offset > self.old_end() || (offset == self.old_end() && self.old_len > 0) {
            return offset - self.old_len + self.new_len;
        }

        // The offset sits on the insertion point or inside replaced text
        match mode {
            PointTrackingMode::Negative if offset == self.position => offset,
            PointTrackingMode::Negative => self.position,
            PointTrackingMode::Positive => self.position + self.new_len,
        }
    }

    /// Maps a span from before this change to after it.
    pub fn map_span(&self, span: Span, mode: SpanTrackingMode) -> Span {
        let (start_mode, end_mode) = match mode {
            SpanTrackingMode::EdgeExclusive => {
                (PointTrackingMode::Positive, PointTrackingMode::Negative)
            }
            SpanTrackingMode::EdgeInclusive => {
                (PointTrackingMode::Negative, PointTrackingMode::Positive)
            }
        };

        let start = self.map_point(span.start, start_mode);
        let end = self.map_point(span.end, end_mode);
        Span::new(start, end.max(start))
    }
}

/// How an offset moves when text is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointTrackingMode {
    /// Stay before the inserted text
    #[default]
    Negative,
    /// Move past the inserted text
    Positive,
}

/// How a span's edges react to insertions exactly at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanTrackingMode {
    /// Insertions at either edge stay outside the span
    #[default]
    EdgeExclusive,
    /// Insertions at either edge become part of the span
    EdgeInclusive,
}

/// One link in the version chain of a document.
#[derive(Debug)]
pub(crate) struct VersionNode {
    number: u64,
    next: OnceLock<VersionLink>,
}

#[derive(Debug)]
pub(crate) struct VersionLink {
    pub(crate) change: TextChange,
    pub(crate) node: Arc<VersionNode>,
}

impl VersionNode {
    pub(crate) fn new(number: u64) -> Self {
        Self {
            number,
            next: OnceLock::new(),
        }
    }

    pub(crate) fn number(&self) -> u64 {
        self.number
    }

    pub(crate) fn next(&self) -> Option<&VersionLink> {
        self.next.get()
    }

    /// Attaches the successor. Fails if a successor was already attached.
    pub(crate) fn link(&self, change: TextChange, node: Arc<VersionNode>) -> Result<(), ()> {
        self.next
            .set(VersionLink { change, node })
            .map_err(|_| ())
    }
}
