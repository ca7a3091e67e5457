//! Engine configuration loaded from `engine.toml`.
//!
//! Every field has a default, so a missing file or an empty `[search]`
//! table yields the engine's stock settings.

use chess_engine::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The file parsed but holds a value the engine cannot use.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// The `[search]` table.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SearchSection {
    /// Main search depth in plies. Defaults to 3.
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Capture-only plies past the main depth. Defaults to 8.
    #[serde(default = "default_quiescence_horizon")]
    pub quiescence_horizon: u32,
    #[serde(default)]
    pub node_budget: Option<u64>,
    #[serde(default)]
    pub movetime_ms: Option<u64>,
    #[serde(default)]
    pub promote_in_search: bool,
}

fn default_depth() -> u32 {
    SearchConfig::default().depth
}

fn default_quiescence_horizon() -> u32 {
    SearchConfig::default().quiescence_horizon
}

impl Default for SearchSection {
    fn default() -> Self {
        SearchSection {
            depth: default_depth(),
            quiescence_horizon: default_quiescence_horizon(),
            node_budget: None,
            movetime_ms: None,
            promote_in_search: false,
        }
    }
}

impl SearchSection {
    pub fn to_search_config(&self) -> SearchConfig {
        SearchConfig {
            depth: self.depth,
            quiescence_horizon: self.quiescence_horizon,
            node_budget: self.node_budget,
            movetime_ms: self.movetime_ms,
            promote_in_search: self.promote_in_search,
        }
    }
}

/// Top-level CLI configuration.
///
/// Uses `engine.toml` in the current directory unless a path is given.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default)]
    pub search: SearchSection,
}

impl CliConfig {
    /// Loads the configuration.
    ///
    /// With `path` set, the file must exist. Without it, [`Self::config_path()`]
    /// is tried and a missing file gives the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read,
    /// [`ConfigError::ParseError`] if it is not valid TOML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::read(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::read(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns the default configuration file path, `engine.toml`.
    pub fn config_path() -> PathBuf {
        PathBuf::from("engine.toml")
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(toml::from_str(&content)?)
    }

    /// Rejects settings that would make a search meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_search(&self.search.to_search_config())
    }
}

/// Checks a search configuration, whether it came from the file or from
/// command line overrides.
pub fn validate_search(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.depth == 0 {
        return Err(ConfigError::Invalid("search depth must be at least 1".into()));
    }
    if config.node_budget == Some(0) {
        return Err(ConfigError::Invalid("search node budget must be positive".into()));
    }
    if config.movetime_ms == Some(0) {
        return Err(ConfigError::Invalid("search movetime must be positive".into()));
    }
    Ok(())
}
