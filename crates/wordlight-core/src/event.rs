//! Change notifications for renderers.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Rust's ownership model makes traditional observer patterns tricky.
//! We use `tokio::sync::broadcast` so the engine never holds references to
//! its consumers:
//! - Events are values, not callbacks
//! - Subscribers receive copies (Clone)
//! - A slow renderer lags instead of blocking the commit

use tokio::sync::broadcast;
use wordlight_buffer::SnapshotSpan;

use crate::state::TagKind;

/// Events emitted by highlight engines.
#[derive(Debug, Clone)]
pub enum HighlightEvent {
    /// The highlight set changed. `span` covers the whole document; consumers
    /// re-query the tags for whatever they display.
    TagsChanged { kind: TagKind, span: SnapshotSpan },
}

/// Event bus for broadcasting highlight events.
///
/// Several engines may share one bus so a renderer subscribes once.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<HighlightEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: HighlightEvent) {
        // Ignore error if no receivers (not a problem)
        let _ = self.sender.send(event);
    }

    /// Subscribes to events.
    ///
    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<HighlightEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper for processing events asynchronously.
///
/// ## Example
///
/// ```ignore
/// let mut handler = EventHandler::new(engine.subscribe());
///
/// tokio::spawn(async move {
///     while let Some(HighlightEvent::TagsChanged { span, .. }) = handler.next().await {
///         let tags = engine.tags(&[span.span], &span.snapshot);
///         // Repaint
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<HighlightEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<HighlightEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<HighlightEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Drains every event already delivered, without waiting.
    pub fn drain(&mut self) -> Vec<HighlightEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                }
                Err(_) => return events,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordlight_buffer::TextBuffer;

    fn changed() -> HighlightEvent {
        HighlightEvent::TagsChanged {
            kind: TagKind::Word,
            span: TextBuffer::from("dump").snapshot().full_span(),
        }
    }

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(changed());

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            HighlightEvent::TagsChanged {
                kind: TagKind::Word,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = EventHandler::new(bus.subscribe());
        let mut rx2 = EventHandler::new(bus.subscribe());

        bus.emit(changed());

        assert!(rx1.next().await.is_some());
        assert_eq!(rx2.drain().len(), 1);
        assert!(rx2.drain().is_empty());
    }
}
