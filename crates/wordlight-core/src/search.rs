//! Finding every occurrence of the highlighted literal.

use wordlight_buffer::{FindOptions, Span, TextSnapshot};

/// Searches a snapshot for a literal.
pub trait RangeSearch: Send + Sync {
    fn find_all(&self, snapshot: &TextSnapshot, literal: &str, options: FindOptions) -> Vec<Span>;
}

/// Scans the snapshot text directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotSearch;

impl RangeSearch for SnapshotSearch {
    fn find_all(&self, snapshot: &TextSnapshot, literal: &str, options: FindOptions) -> Vec<Span> {
        snapshot.find_all(literal, options)
    }
}
