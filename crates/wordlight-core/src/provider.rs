//! Creating engines from configuration.
//!
//! ## Learning: The Facade Pattern
//!
//! `HighlightProvider` turns a [`Config`] into ready-to-use engines. Hosts
//! never assemble registries, markers or launchers themselves; they ask for
//! an engine per open document of the right content type.

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::Config;
use crate::engine::HighlightEngine;
use crate::event::EventBus;
use crate::extent::WordNavigator;
use crate::launcher::{ProcessLauncher, SystemLauncher};
use crate::registry::{CommandSet, ToolAssignments};
use crate::resolver::{ReferenceMarkers, ReferenceResolver, WordResolver};
use crate::search::SnapshotSearch;
use crate::{CoreError, CoreResult};

/// Builds highlight engines for documents of the configured content type.
pub struct HighlightProvider {
    content_type: String,
    commands: Arc<CommandSet>,
    tools: Arc<ToolAssignments>,
    markers: ReferenceMarkers,
    launcher: Arc<dyn ProcessLauncher>,
    runtime: Handle,
    events: EventBus,
}

impl HighlightProvider {
    /// Creates a provider on the current tokio runtime.
    pub fn new(config: &Config) -> CoreResult<Self> {
        let runtime = Handle::try_current().map_err(|_| CoreError::NoRuntime)?;
        Ok(Self::with_runtime(config, runtime))
    }

    /// Creates a provider spawning background work on `runtime`.
    pub fn with_runtime(config: &Config, runtime: Handle) -> Self {
        let commands: CommandSet = config.highlight.commands.iter().cloned().collect();
        let tools: ToolAssignments = config.tools.iter().collect();

        tracing::debug!(
            "Highlighting {} commands and {} tools for '{}'",
            commands.len(),
            config.tools.len(),
            config.highlight.content_type
        );

        Self {
            content_type: config.highlight.content_type.clone(),
            commands: Arc::new(commands),
            tools: Arc::new(tools),
            markers: ReferenceMarkers::from(&config.reference),
            launcher: Arc::new(SystemLauncher),
            runtime,
            events: EventBus::new(),
        }
    }

    /// Replaces the process launcher used by action engines.
    pub fn with_launcher(mut self, launcher: Arc<dyn ProcessLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    /// The bus every engine from this provider publishes on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// An engine highlighting the command under the caret, or `None` if the
    /// document's content type is not handled.
    pub fn word_engine(&self, content_type: &str) -> Option<HighlightEngine<WordResolver>> {
        if !self.handles(content_type) {
            return None;
        }
        let resolver = WordResolver::new(Arc::new(WordNavigator), self.commands.clone());
        Some(HighlightEngine::with_events(
            resolver,
            Arc::new(SnapshotSearch),
            self.runtime.clone(),
            self.events.clone(),
        ))
    }

    /// An engine highlighting the file reference under the caret, or `None`
    /// if the document's content type is not handled.
    pub fn action_engine(&self, content_type: &str) -> Option<HighlightEngine<ReferenceResolver>> {
        if !self.handles(content_type) {
            return None;
        }
        let resolver = ReferenceResolver::new(
            self.markers.clone(),
            self.tools.clone(),
            self.launcher.clone(),
        );
        Some(HighlightEngine::with_events(
            resolver,
            Arc::new(SnapshotSearch),
            self.runtime.clone(),
            self.events.clone(),
        ))
    }

    fn handles(&self, content_type: &str) -> bool {
        let handled = content_type.eq_ignore_ascii_case(&self.content_type);
        if !handled {
            tracing::trace!("No highlighting for content type '{}'", content_type);
        }
        handled
    }
}
