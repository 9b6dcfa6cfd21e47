//! Highlighter configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[serde(default)]` uses `Default::default()` for missing fields, so a
//! config file only has to mention what it changes:
//!
//! ```toml
//! [highlight]
//! commands = ["dump", "memset", "loadmem"]
//!
//! [tools]
//! ".txt" = "notepad"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Word highlighting settings
    pub highlight: HighlightConfig,

    /// Reference (action link) settings
    pub reference: ReferenceConfig,

    /// Tool assigned to each file extension, e.g. `".txt" = "notepad"`
    pub tools: HashMap<String, String>,

    /// Background work settings
    pub engine: EngineConfig,
}

impl Config {
    /// Loads config from the default location.
    pub fn load() -> Self {
        Self::load_from_default_path().unwrap_or_else(|err| {
            tracing::warn!("Falling back to default config: {}", err);
            Self::default()
        })
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads from the default config path.
    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("wordlight").join("config.toml"))
    }

    /// Saves the config to a file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Word highlighting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Content type the engines attach to
    pub content_type: String,

    /// Command words worth highlighting
    pub commands: Vec<String>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            content_type: "vsdscript".to_string(),
            commands: Vec::new(),
        }
    }
}

/// Delimiters of a path reference inside a line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Token in front of the path
    pub open: String,

    /// Token after the path
    pub close: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            open: "file://".to_string(),
            close: ">".to_string(),
        }
    }
}

/// Background work configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on blocking worker threads
    pub worker_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { worker_threads: 4 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
