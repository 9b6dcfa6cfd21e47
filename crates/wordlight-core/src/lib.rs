//! # Wordlight Core
//!
//! Caret-driven highlighting that never blocks the editing thread.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     HighlightProvider                         │
//! │   Config ─► CommandSet / ToolAssignments / markers            │
//! │        │                                                      │
//! │  ┌─────┴────────────────────────────────────────────┐         │
//! │  │          HighlightEngine<R: ExtentResolver>      │         │
//! │  │  notify_* ─► request slot ─► blocking pool       │         │
//! │  │                  │              │                │         │
//! │  │                  │      resolve ─► search        │         │
//! │  │                  └──── commit (generation check) │         │
//! │  │                               │                  │         │
//! │  │        HighlightState ◄───────┘ ─► EventBus      │         │
//! │  └──────────────────────────────────────────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two resolvers share the engine: [`WordResolver`] highlights the
//! registered command under the caret, [`ReferenceResolver`] highlights a
//! `file://` reference and opens it with the configured tool.

pub mod config;
pub mod engine;
pub mod event;
pub mod extent;
pub mod launcher;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod search;
pub mod state;

pub use config::Config;
pub use engine::HighlightEngine;
pub use event::{EventBus, EventHandler, HighlightEvent};
pub use extent::{Extent, ExtentFinder, WordNavigator};
pub use launcher::{ProcessLauncher, SystemLauncher};
pub use provider::HighlightProvider;
pub use registry::{CapabilityRegistry, CommandSet, HandlerRegistry, ToolAssignments};
pub use resolver::{ExtentResolver, ReferenceMarkers, ReferenceResolver, WordResolver};
pub use search::{RangeSearch, SnapshotSearch};
pub use state::{HighlightState, TagKind, TagSpan};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No tokio runtime is available for background highlighting")]
    NoRuntime,

    #[error("Buffer error: {0}")]
    Buffer(#[from] wordlight_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
