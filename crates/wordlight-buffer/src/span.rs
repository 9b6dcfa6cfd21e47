//! Character spans and normalized span sets.
//!
//! ## Learning: Half-open Ranges
//!
//! A `Span` covers `start..end` with an exclusive end, the same convention
//! as `std::ops::Range`. Two spans that merely touch (`a.end == b.start`)
//! do not overlap, and an empty span overlaps nothing.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A half-open range of character offsets within one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// First character offset (inclusive)
    pub start: usize,
    /// Past-the-end character offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is after end {end}");
        Self { start, end }
    }

    /// An empty span at an offset.
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if `offset` lies in `start..=end`.
    pub fn contains_inclusive(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Returns true if the two spans share at least one character.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// Returns the shared portion of two spans, if any.
    pub fn overlap(&self, other: &Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then(|| Span::new(start, end))
    }

    /// Converts to a standard range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}..{})", self.start, self.end)
    }
}

/// A sorted set of non-empty spans where no two spans overlap or touch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedSpans {
    spans: Vec<Span>,
}

impl NormalizedSpans {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the spans in ascending order.
    pub fn as_slice(&self) -> &[Span] {
        &self.spans
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Returns true if any span in the set overlaps `span`.
    pub fn overlaps_span(&self, span: &Span) -> bool {
        // Spans are sorted and disjoint, so the first candidate is the one
        // whose end lies past `span.start`.
        let idx = self.spans.partition_point(|s| s.end <= span.start);
        self.spans.get(idx).is_some_and(|s| s.overlaps(span))
    }

    /// Returns the overlapping portions of the two sets.
    pub fn intersection(&self, other: &NormalizedSpans) -> NormalizedSpans {
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);

        while i < self.spans.len() && j < other.spans.len() {
            let a = self.spans[i];
            let b = other.spans[j];

            if let Some(shared) = a.overlap(&b) {
                result.push(shared);
            }

            // Advance whichever span finishes first
            if a.end <= b.end {
                i += 1;
            } else {
                j += 1;
            }
        }

        NormalizedSpans::from_iter(result)
    }
}

impl FromIterator<Span> for NormalizedSpans {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        let mut sorted: Vec<Span> = iter.into_iter().filter(|s| !s.is_empty()).collect();
        sorted.sort_by_key(|s| (s.start, s.end));

        let mut spans: Vec<Span> = Vec::with_capacity(sorted.len());
        for span in sorted {
            match spans.last_mut() {
                Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
                _ => spans.push(span),
            }
        }

        Self { spans }
    }
}

impl<'a> IntoIterator for &'a NormalizedSpans {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}
