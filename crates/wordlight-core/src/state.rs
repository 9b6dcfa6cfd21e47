//! The published highlight set and the tag query over it.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use wordlight_buffer::{
    BufferResult, NormalizedSpans, SnapshotSpan, Span, SpanTrackingMode, TextSnapshot,
};

/// What kind of highlight a tag represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// Occurrence of the command word under the caret
    Word,
    /// Occurrence of the file reference under the caret
    Action,
}

/// A highlighted span in the snapshot the tags were requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSpan {
    pub span: Span,
    pub kind: TagKind,
}

/// An immutable highlight set, always computed for a single request.
///
/// The engine swaps whole values; readers keep the `Arc` they loaded and
/// never see a half-updated set.
#[derive(Debug, Clone, Default)]
pub struct HighlightState {
    generation: u64,
    anchor: Option<SnapshotSpan>,
    /// Measured against the anchor's snapshot
    matches: NormalizedSpans,
}

impl HighlightState {
    /// A state highlighting `matches`, with the caret on `anchor`.
    pub fn new(generation: u64, anchor: SnapshotSpan, matches: NormalizedSpans) -> Self {
        Self {
            generation,
            anchor: Some(anchor),
            matches,
        }
    }

    /// A state with nothing highlighted.
    pub fn empty(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    /// The request generation this state was computed for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The span under the caret.
    pub fn anchor(&self) -> Option<&SnapshotSpan> {
        self.anchor.as_ref()
    }

    pub fn matches(&self) -> &NormalizedSpans {
        &self.matches
    }

    pub fn is_empty(&self) -> bool {
        self.anchor.is_none()
    }

    /// Returns the tags overlapping `spans`, measured in `target`.
    ///
    /// The anchor comes first whenever it overlaps the query, followed by
    /// every overlapping portion of the matches. The anchor is itself one of
    /// the matches, so it is reported twice.
    pub fn tags(
        &self,
        spans: &NormalizedSpans,
        target: &TextSnapshot,
        kind: TagKind,
    ) -> BufferResult<Vec<TagSpan>> {
        let Some(anchor) = &self.anchor else {
            return Ok(Vec::new());
        };
        if spans.is_empty() || self.matches.is_empty() {
            return Ok(Vec::new());
        }

        let (anchor_span, matches) = if anchor.snapshot == *target {
            (anchor.span, Cow::Borrowed(&self.matches))
        } else {
            let source = &anchor.snapshot;
            let matches = self
                .matches
                .iter()
                .map(|span| source.translate_span(*span, target, SpanTrackingMode::EdgeExclusive))
                .collect::<BufferResult<NormalizedSpans>>()?;
            let anchor = anchor.translate_to(target, SpanTrackingMode::EdgeExclusive)?;
            (anchor.span, Cow::Owned(matches))
        };

        let mut tags = Vec::with_capacity(matches.len() + 1);
        if spans.overlaps_span(&anchor_span) {
            tags.push(TagSpan {
                span: anchor_span,
                kind,
            });
        }
        tags.extend(
            spans
                .intersection(&matches)
                .iter()
                .map(|&span| TagSpan { span, kind }),
        );

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordlight_buffer::TextBuffer;

    fn spans(list: &[(usize, usize)]) -> NormalizedSpans {
        list.iter().map(|&(s, e)| Span::new(s, e)).collect()
    }

    fn dump_state(buffer: &TextBuffer) -> HighlightState {
        // "dump a; dump b; dump c"
        let snapshot = buffer.snapshot();
        HighlightState::new(
            1,
            SnapshotSpan::new(snapshot, Span::new(8, 12)),
            spans(&[(0, 4), (8, 12), (16, 20)]),
        )
    }

    #[test]
    fn test_anchor_first_then_all_matches() {
        let buffer = TextBuffer::from("dump a; dump b; dump c");
        let state = dump_state(&buffer);

        let tags = state
            .tags(&spans(&[(0, 22)]), &buffer.snapshot(), TagKind::Word)
            .unwrap();
        let found: Vec<Span> = tags.iter().map(|t| t.span).collect();

        assert_eq!(
            found,
            vec![
                Span::new(8, 12),
                Span::new(0, 4),
                Span::new(8, 12),
                Span::new(16, 20)
            ]
        );
        assert!(tags.iter().all(|t| t.kind == TagKind::Word));
    }

    #[test]
    fn test_only_overlapping_portions() {
        let buffer = TextBuffer::from("dump a; dump b; dump c");
        let state = dump_state(&buffer);

        let tags = state
            .tags(&spans(&[(2, 6)]), &buffer.snapshot(), TagKind::Word)
            .unwrap();
        assert_eq!(
            tags,
            vec![TagSpan {
                span: Span::new(2, 4),
                kind: TagKind::Word
            }]
        );
    }

    #[test]
    fn test_translated_to_newer_snapshot() {
        let mut buffer = TextBuffer::from("a = dump x");
        let snapshot = buffer.snapshot();
        let state = HighlightState::new(
            3,
            SnapshotSpan::new(snapshot, Span::new(4, 8)),
            spans(&[(4, 8)]),
        );

        let newer = buffer.insert(0, "  ").unwrap();
        let tags = state
            .tags(&spans(&[(0, newer.len())]), &newer, TagKind::Action)
            .unwrap();

        let found: Vec<Span> = tags.iter().map(|t| t.span).collect();
        assert_eq!(found, vec![Span::new(6, 10), Span::new(6, 10)]);
    }

    #[test]
    fn test_empty_state_has_no_tags() {
        let buffer = TextBuffer::from("dump");
        let state = HighlightState::empty(7);
        assert!(state.is_empty());
        assert_eq!(state.generation(), 7);
        assert!(
            state
                .tags(&spans(&[(0, 4)]), &buffer.snapshot(), TagKind::Word)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_foreign_snapshot_is_an_error() {
        let buffer = TextBuffer::from("dump a; dump b; dump c");
        let state = dump_state(&buffer);
        let other = TextBuffer::from("dump a; dump b; dump c").snapshot();

        assert!(
            state
                .tags(&spans(&[(0, 4)]), &other, TagKind::Word)
                .is_err()
        );
    }
}
