//! Configuration management for vtconsole.
//!
//! The configuration file is located at `~/.vtconsole/config.toml`:
//!
//! ```toml
//! [console]
//! prompt = "> "
//! max_command = 32
//! max_history = 6
//! insert_toggle = true
//! cursor_shape = true
//!
//! [log]
//! level = "info"
//! ```
//!
//! Every key is optional; missing keys take their default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::console::ConsoleSettings;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid config {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Console settings
    pub console: ConsoleConfig,
    /// Log settings
    pub log: LogConfig,
}

/// `[console]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub prompt: String,
    pub max_command: usize,
    pub max_history: usize,
    pub insert_toggle: bool,
    pub cursor_shape: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleSettings::default().into()
    }
}

impl From<ConsoleSettings> for ConsoleConfig {
    fn from(s: ConsoleSettings) -> Self {
        Self {
            prompt: s.prompt,
            max_command: s.max_command,
            max_history: s.max_history,
            insert_toggle: s.insert_toggle,
            cursor_shape: s.cursor_shape,
        }
    }
}

impl From<&ConsoleConfig> for ConsoleSettings {
    fn from(c: &ConsoleConfig) -> Self {
        Self {
            prompt: c.prompt.clone(),
            max_command: c.max_command,
            max_history: c.max_history,
            insert_toggle: c.insert_toggle,
            cursor_shape: c.cursor_shape,
        }
    }
}

/// `[log]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is
    /// logged and also yields the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Console settings described by this configuration
    pub fn settings(&self) -> ConsoleSettings {
        (&self.console).into()
    }

    /// `~/.vtconsole`, created on first use
    pub fn config_dir() -> Option<PathBuf> {
        let dir = home_dir()?.join(".vtconsole");
        if !dir.exists() {
            let _ = fs::create_dir_all(&dir);
        }
        Some(dir)
    }

    /// Get config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
