//! Deciding what is under the caret.
//!
//! ## Learning: Strategy via Generics
//!
//! `HighlightEngine<R: ExtentResolver>` owns the scheduling and commit
//! protocol once; the resolvers only answer "which span should be
//! highlighted for this caret?". Static dispatch keeps the two variants
//! zero-cost and lets each carry its own collaborators.

use std::path::Path;
use std::sync::Arc;

use wordlight_buffer::{BufferError, SnapshotPoint, Span, TextSnapshot};

use crate::config::ReferenceConfig;
use crate::extent::{Extent, ExtentFinder};
use crate::launcher::ProcessLauncher;
use crate::registry::{CapabilityRegistry, HandlerRegistry};
use crate::state::TagKind;

/// Resolves the caret position to the span worth highlighting.
pub trait ExtentResolver: Send + Sync + 'static {
    /// The tag kind reported for this resolver's highlights.
    fn kind(&self) -> TagKind;

    /// Returns the span to highlight, or `None` to clear the highlights.
    ///
    /// Runs on a background thread and may block on the snapshot.
    fn resolve(&self, caret: &SnapshotPoint) -> Option<Span>;
}

/// Highlights the registered command word under the caret.
pub struct WordResolver {
    finder: Arc<dyn ExtentFinder>,
    registry: Arc<dyn CapabilityRegistry>,
}

impl WordResolver {
    pub fn new(finder: Arc<dyn ExtentFinder>, registry: Arc<dyn CapabilityRegistry>) -> Self {
        Self { finder, registry }
    }

    fn is_valid(&self, snapshot: &TextSnapshot, extent: &Extent) -> bool {
        extent.significant
            && snapshot
                .slice(extent.span)
                .is_ok_and(|text| self.registry.contains(&text))
    }
}

impl ExtentResolver for WordResolver {
    fn kind(&self) -> TagKind {
        TagKind::Word
    }

    fn resolve(&self, caret: &SnapshotPoint) -> Option<Span> {
        let snapshot = &caret.snapshot;
        let extent = self.finder.extent_of_word_at(snapshot, caret.offset)?;
        if self.is_valid(snapshot, &extent) {
            return Some(extent.span);
        }

        // A caret right after a word lands on whatever follows it; look one
        // character back, unless that would cross a line or whitespace.
        let retry = extent.span.start == caret.offset
            && !caret.is_line_start()
            && !caret.char_before().is_some_and(char::is_whitespace);
        if !retry {
            return None;
        }

        let previous = caret.previous()?;
        let extent = self.finder.extent_of_word_at(snapshot, previous.offset)?;
        self.is_valid(snapshot, &extent).then_some(extent.span)
    }
}

/// Opening and closing tokens around a path reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMarkers {
    pub open: String,
    pub close: String,
}

impl Default for ReferenceMarkers {
    fn default() -> Self {
        Self::from(&ReferenceConfig::default())
    }
}

impl From<&ReferenceConfig> for ReferenceMarkers {
    fn from(config: &ReferenceConfig) -> Self {
        Self {
            open: config.open.clone(),
            close: config.close.clone(),
        }
    }
}

impl ReferenceMarkers {
    /// Finds the referenced text in a line, as character columns.
    ///
    /// Uses the first opening and the first closing token of the line.
    pub fn locate(&self, line: &str) -> Option<Span> {
        if self.open.is_empty() || self.close.is_empty() {
            return None;
        }

        let open = line.find(&self.open)?;
        let close = line.find(&self.close)?;
        let open_end = open + self.open.len();
        if close < open_end {
            return None;
        }

        let start = line[..open_end].chars().count();
        let end = start + line[open_end..close].chars().count();
        Some(Span::new(start, end))
    }
}

/// Failures while resolving a reference. None of them reach the caller.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ResolveError {
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("Failed to launch {command}: {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },
}

/// Highlights a `file://...>` reference under the caret and opens the file
/// with the tool assigned to its extension.
pub struct ReferenceResolver {
    markers: ReferenceMarkers,
    handlers: Arc<dyn HandlerRegistry>,
    launcher: Arc<dyn ProcessLauncher>,
}

impl ReferenceResolver {
    pub fn new(
        markers: ReferenceMarkers,
        handlers: Arc<dyn HandlerRegistry>,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Self {
        Self {
            markers,
            handlers,
            launcher,
        }
    }

    fn try_resolve(&self, caret: &SnapshotPoint) -> Result<Option<Span>, ResolveError> {
        let line = caret.snapshot.line_containing(caret.offset)?;
        let Some(reference) = self.markers.locate(&line.text) else {
            return Ok(None);
        };

        // Strictly inside: not on the opening token's end nor on the closing token
        let column = caret.offset - line.start;
        if column <= reference.start || column >= reference.end {
            return Ok(None);
        }

        let path: String = line
            .text
            .chars()
            .skip(reference.start)
            .take(reference.len())
            .collect();
        if !Path::new(&path).is_file() {
            return Ok(None);
        }

        let extension = Path::new(&path)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        if let Some(command) = self.handlers.resolve(&extension) {
            self.launcher
                .launch(&command, &path)
                .map_err(|source| ResolveError::Launch { command, source })?;
        }

        Ok(Some(Span::new(
            line.start + reference.start,
            line.start + reference.end,
        )))
    }
}

impl ExtentResolver for ReferenceResolver {
    fn kind(&self) -> TagKind {
        TagKind::Action
    }

    fn resolve(&self, caret: &SnapshotPoint) -> Option<Span> {
        match self.try_resolve(caret) {
            Ok(span) => span,
            Err(err) => {
                tracing::trace!("Reference not highlighted: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::WordNavigator;
    use crate::registry::{CommandSet, ToolAssignments};
    use parking_lot::Mutex;
    use wordlight_buffer::TextBuffer;

    fn word_resolver(commands: &[&str]) -> WordResolver {
        let registry: CommandSet = commands.iter().copied().collect();
        WordResolver::new(Arc::new(WordNavigator), Arc::new(registry))
    }

    fn caret(text: &str, offset: usize) -> SnapshotPoint {
        SnapshotPoint::new(TextBuffer::from(text).snapshot(), offset).unwrap()
    }

    #[test]
    fn test_word_on_registered_command() {
        let resolver = word_resolver(&["dump"]);
        assert_eq!(resolver.resolve(&caret("  dump 10", 3)), Some(Span::new(2, 6)));
        assert_eq!(resolver.resolve(&caret("  dumpx 10", 3)), None);
    }

    #[test]
    fn test_retry_after_word_end() {
        let resolver = word_resolver(&["foo"]);
        assert_eq!(resolver.resolve(&caret("foo.bar", 3)), Some(Span::new(0, 3)));
        assert_eq!(resolver.resolve(&caret("foo", 3)), Some(Span::new(0, 3)));
    }

    #[test]
    fn test_no_retry_after_whitespace() {
        let resolver = word_resolver(&["foo"]);
        assert_eq!(resolver.resolve(&caret("foo .bar", 4)), None);
    }

    #[test]
    fn test_no_retry_at_line_start() {
        let resolver = word_resolver(&["x"]);
        assert_eq!(resolver.resolve(&caret(";x", 0)), None);
        assert_eq!(resolver.resolve(&caret("x\n;y", 2)), None);
    }

    #[test]
    fn test_no_retry_when_caret_inside_extent() {
        let resolver = word_resolver(&["fo"]);
        // Caret in the middle of "foo": the extent starts before the caret
        assert_eq!(resolver.resolve(&caret("foo", 1)), None);
    }

    #[test]
    fn test_locate_reference() {
        let markers = ReferenceMarkers::default();
        assert_eq!(markers.locate("see <file://a/b.txt> here"), Some(Span::new(12, 19)));
        assert_eq!(markers.locate("x > <file://a.txt"), None);
        assert_eq!(markers.locate("no reference"), None);
        assert_eq!(markers.locate("é<file://ü.txt>"), Some(Span::new(9, 14)));
    }

    #[derive(Default)]
    struct RecordingLauncher {
        launched: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl ProcessLauncher for RecordingLauncher {
        fn launch(&self, command: &str, argument: &str) -> std::io::Result<()> {
            self.launched
                .lock()
                .push((command.to_string(), argument.to_string()));
            if self.fail {
                return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no tool"));
            }
            Ok(())
        }
    }

    fn reference_resolver(launcher: Arc<RecordingLauncher>) -> ReferenceResolver {
        let mut tools = ToolAssignments::new();
        tools.assign(".txt", "notepad");
        ReferenceResolver::new(ReferenceMarkers::default(), Arc::new(tools), launcher)
    }

    #[test]
    fn test_missing_file_is_not_a_reference() {
        let launcher = Arc::new(RecordingLauncher::default());
        let resolver = reference_resolver(Arc::clone(&launcher));

        assert_eq!(resolver.resolve(&caret("<file://C:/missing.txt>", 12)), None);
        assert!(launcher.launched.lock().is_empty());
    }

    #[test]
    fn test_existing_file_launches_tool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "notes").unwrap();
        let path = path.display().to_string();

        let launcher = Arc::new(RecordingLauncher::default());
        let resolver = reference_resolver(Arc::clone(&launcher));

        let line = format!("open <file://{path}> now");
        let span = resolver.resolve(&caret(&line, 15)).unwrap();

        assert_eq!(span, Span::new(13, 13 + path.chars().count()));
        assert_eq!(
            launcher.launched.lock().as_slice(),
            &[("notepad".to_string(), path)]
        );
    }

    #[test]
    fn test_caret_on_token_edge_is_outside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "notes").unwrap();
        let line = format!("<file://{}>", path.display());

        let launcher = Arc::new(RecordingLauncher::default());
        let resolver = reference_resolver(Arc::clone(&launcher));

        // Right after "file://" and right on ">"
        assert_eq!(resolver.resolve(&caret(&line, 8)), None);
        assert_eq!(resolver.resolve(&caret(&line, line.chars().count() - 1)), None);
        assert!(launcher.launched.lock().is_empty());
    }

    #[test]
    fn test_launch_failure_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "notes").unwrap();
        let line = format!("<file://{}>", path.display());

        let launcher = Arc::new(RecordingLauncher {
            fail: true,
            ..Default::default()
        });
        let resolver = reference_resolver(Arc::clone(&launcher));

        assert_eq!(resolver.resolve(&caret(&line, 10)), None);
        assert_eq!(launcher.launched.lock().len(), 1);
    }

    #[test]
    fn test_file_without_assigned_tool_still_highlights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.bin");
        std::fs::write(&path, [0u8; 4]).unwrap();
        let line = format!("<file://{}>", path.display());

        let launcher = Arc::new(RecordingLauncher::default());
        let resolver = reference_resolver(Arc::clone(&launcher));

        assert!(resolver.resolve(&caret(&line, 10)).is_some());
        assert!(launcher.launched.lock().is_empty());
    }
}
