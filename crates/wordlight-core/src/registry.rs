//! Read-only lookups the resolvers depend on.
//!
//! ## Learning: Trait Objects at the Seams
//!
//! The resolvers only see `dyn CapabilityRegistry` and `dyn HandlerRegistry`.
//! The configuration-backed types below are the defaults; hosts with their
//! own command tables plug in by implementing the traits. The `Send + Sync`
//! bounds let one registry serve every background recomputation.

use std::collections::{HashMap, HashSet};

/// Set of literals the caret must land on for a word to be highlighted.
pub trait CapabilityRegistry: Send + Sync {
    /// Returns true if `literal` is a recognized command.
    fn contains(&self, literal: &str) -> bool;
}

/// Maps a file extension to the command that opens such files.
pub trait HandlerRegistry: Send + Sync {
    /// Returns the command assigned to `extension` (including the dot).
    fn resolve(&self, extension: &str) -> Option<String>;
}

/// Command words from the configuration.
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    commands: HashSet<String>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command. Empty strings are ignored.
    pub fn insert(&mut self, command: impl Into<String>) {
        let command = command.into();
        if !command.is_empty() {
            self.commands.insert(command);
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CommandSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = CommandSet::new();
        for command in iter {
            set.insert(command);
        }
        set
    }
}

impl CapabilityRegistry for CommandSet {
    fn contains(&self, literal: &str) -> bool {
        !literal.is_empty() && self.commands.contains(literal)
    }
}

/// Extension to tool assignments from the configuration.
///
/// Extensions are matched without regard to case and with or without the
/// leading dot, so `"TXT"`, `".txt"` and `".Txt"` all name the same entry.
#[derive(Debug, Clone, Default)]
pub struct ToolAssignments {
    tools: HashMap<String, String>,
}

impl ToolAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a tool to an extension. Blank commands are ignored.
    pub fn assign(&mut self, extension: &str, command: impl Into<String>) {
        let command = command.into();
        if command.trim().is_empty() {
            return;
        }
        self.tools.insert(normalize_extension(extension), command);
    }
}

impl<'a> FromIterator<(&'a String, &'a String)> for ToolAssignments {
    fn from_iter<I: IntoIterator<Item = (&'a String, &'a String)>>(iter: I) -> Self {
        let mut tools = ToolAssignments::new();
        for (extension, command) in iter {
            tools.assign(extension, command.as_str());
        }
        tools
    }
}

impl HandlerRegistry for ToolAssignments {
    fn resolve(&self, extension: &str) -> Option<String> {
        if extension.is_empty() {
            return None;
        }
        self.tools.get(&normalize_extension(extension)).cloned()
    }
}

fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().trim_start_matches('.');
    format!(".{}", trimmed.to_lowercase())
}
