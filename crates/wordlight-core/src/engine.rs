//! The highlight engine: request coalescing and the commit protocol.
//!
//! ## Learning: Lock-free Reads with `arc-swap`
//!
//! The caret thread and the renderer never take a lock:
//! - The live request is an `ArcSwapOption` written last-writer-wins
//! - The published state is an `ArcSwap` readers `load()` without blocking
//!
//! Only the background commit takes `commit_lock`, so the re-check of the
//! request and the swap of the state happen as one step.
//!
//! ```text
//! notify_caret_moved ──► request slot ──► spawn_blocking (at most one queued)
//!                                               │
//!                                   resolve ─► search ─► commit (lock)
//!                                                           │
//!                             state slot ◄──────────────────┤
//!                                                           ▼
//!                                                    TagsChanged event
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use arc_swap::{ArcSwap, ArcSwapOption};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{Notify, broadcast};
use wordlight_buffer::{
    BufferError, FindOptions, NormalizedSpans, SnapshotPoint, SnapshotSpan, Span, TextSnapshot,
};

use crate::event::{EventBus, HighlightEvent};
use crate::resolver::ExtentResolver;
use crate::search::RangeSearch;
use crate::state::{HighlightState, TagKind, TagSpan};

/// The most recent caret position the engine was told about.
#[derive(Debug)]
struct HighlightRequest {
    generation: u64,
    point: SnapshotPoint,
}

struct EngineInner<R> {
    resolver: R,
    search: Arc<dyn RangeSearch>,
    runtime: Handle,
    events: EventBus,

    request: ArcSwapOption<HighlightRequest>,
    state: ArcSwap<HighlightState>,
    commit_lock: Mutex<()>,

    generation: AtomicU64,
    /// A recomputation is spawned but has not read the request yet
    queued: AtomicBool,
    running: AtomicUsize,
    idle: Notify,
}

/// Keeps the caret's word (or reference) and its occurrences highlighted.
///
/// Cloning is cheap; clones share the same state.
pub struct HighlightEngine<R: ExtentResolver> {
    inner: Arc<EngineInner<R>>,
}

impl<R: ExtentResolver> Clone for HighlightEngine<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: ExtentResolver> HighlightEngine<R> {
    /// Creates an engine running its recomputations on `runtime`'s blocking pool.
    pub fn new(resolver: R, search: Arc<dyn RangeSearch>, runtime: Handle) -> Self {
        Self::with_events(resolver, search, runtime, EventBus::new())
    }

    /// Creates an engine publishing its changes on a shared bus.
    pub fn with_events(
        resolver: R,
        search: Arc<dyn RangeSearch>,
        runtime: Handle,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                resolver,
                search,
                runtime,
                events,
                request: ArcSwapOption::empty(),
                state: ArcSwap::from_pointee(HighlightState::empty(0)),
                commit_lock: Mutex::new(()),
                generation: AtomicU64::new(0),
                queued: AtomicBool::new(false),
                running: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    pub fn kind(&self) -> TagKind {
        self.inner.resolver.kind()
    }

    /// Subscribes to `TagsChanged` notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<HighlightEvent> {
        self.inner.events.subscribe()
    }

    /// The currently published state.
    pub fn state(&self) -> Arc<HighlightState> {
        self.inner.state.load_full()
    }

    /// Records a caret move and schedules a recomputation.
    ///
    /// Never blocks. A move that stays inside the current anchor on the same
    /// snapshot is ignored.
    pub fn notify_caret_moved(&self, caret: SnapshotPoint) {
        if let Some(anchor) = self.inner.state.load().anchor() {
            if anchor.snapshot == caret.snapshot && anchor.span.contains_inclusive(caret.offset) {
                tracing::trace!("Caret {} still inside {}", caret.offset, anchor.span);
                return;
            }
        }
        self.request(caret);
    }

    /// Records a layout change. Ignored unless the document moved past
    /// `old_version`.
    pub fn notify_layout_changed(&self, old_version: u64, caret: SnapshotPoint) {
        if caret.snapshot.version() == old_version {
            tracing::trace!("Layout change without a new version");
            return;
        }
        self.notify_caret_moved(caret);
    }

    /// Returns the tags overlapping `spans`, measured in `snapshot`.
    ///
    /// The anchor comes first and is repeated among the matches.
    pub fn tags(&self, spans: &[Span], snapshot: &TextSnapshot) -> Vec<TagSpan> {
        let query: NormalizedSpans = spans.iter().copied().collect();
        let state = self.inner.state.load();

        match state.tags(&query, snapshot, self.kind()) {
            Ok(tags) => tags,
            Err(err @ BufferError::ForeignDocument { .. }) => {
                contract_violation(&err);
                Vec::new()
            }
            Err(err) => {
                // The renderer is still on an older snapshot; it re-queries
                // once it catches up.
                tracing::trace!("Tags not available for {:?}: {}", snapshot, err);
                Vec::new()
            }
        }
    }

    /// Waits until no recomputation is queued or running.
    pub async fn idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.inner.running.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn request(&self, point: SnapshotPoint) {
        let inner = &self.inner;
        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        inner
            .request
            .store(Some(Arc::new(HighlightRequest { generation, point })));

        if inner.queued.swap(true, Ordering::SeqCst) {
            return;
        }

        let guard = RunningGuard::new(Arc::clone(inner));
        inner.runtime.spawn_blocking(move || {
            guard.inner.recompute();
        });
    }
}

impl<R: ExtentResolver> EngineInner<R> {
    fn recompute(&self) {
        // Cleared before reading the request, so a request recorded from now
        // on schedules its own run.
        self.queued.store(false, Ordering::SeqCst);
        let Some(request) = self.request.load_full() else {
            return;
        };
        let generation = request.generation;
        let snapshot = &request.point.snapshot;

        let Some(span) = self.resolver.resolve(&request.point) else {
            self.commit(generation, snapshot, HighlightState::empty(generation));
            return;
        };

        let anchor = SnapshotSpan::new(snapshot.clone(), span);
        if self.state.load().anchor() == Some(&anchor) {
            tracing::trace!("Anchor {} unchanged", span);
            return;
        }

        let literal = match snapshot.slice(span) {
            Ok(literal) => literal,
            Err(err) => {
                contract_violation(&err);
                self.commit(generation, snapshot, HighlightState::empty(generation));
                return;
            }
        };

        let matches: NormalizedSpans = self
            .search
            .find_all(snapshot, &literal, FindOptions::EXACT_WORD)
            .into_iter()
            .collect();

        self.commit(
            generation,
            snapshot,
            HighlightState::new(generation, anchor, matches),
        );
    }

    fn commit(&self, generation: u64, snapshot: &TextSnapshot, state: HighlightState) {
        let _lock = self.commit_lock.lock();

        let live = self.request.load();
        if live.as_ref().map(|request| request.generation) != Some(generation) {
            return;
        }
        if self.state.load().generation() == generation {
            return;
        }

        tracing::debug!(
            "Committing {:?} highlights for request {}: {} matches",
            self.resolver.kind(),
            generation,
            state.matches().len()
        );
        self.state.store(Arc::new(state));
        self.events.emit(HighlightEvent::TagsChanged {
            kind: self.resolver.kind(),
            span: snapshot.full_span(),
        });
    }
}

/// Counts a spawned recomputation until it finishes, even by panicking.
struct RunningGuard<R> {
    inner: Arc<EngineInner<R>>,
}

impl<R> RunningGuard<R> {
    fn new(inner: Arc<EngineInner<R>>) -> Self {
        inner.running.fetch_add(1, Ordering::SeqCst);
        Self { inner }
    }
}

impl<R> Drop for RunningGuard<R> {
    fn drop(&mut self) {
        if self.inner.running.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

/// A collaborator broke its contract. Loud in debug builds.
fn contract_violation(err: &BufferError) {
    tracing::error!("Contract violation: {}", err);
    if cfg!(debug_assertions) {
        panic!("Contract violation: {err}");
    }
}
