//! Run settings loaded from RON, TOML or JSON.
//!
//! The format is picked from the file extension. Every field has a default,
//! so a config file only needs the settings it changes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Why a run config could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Extension is not `.ron`, `.toml` or `.json`.
    #[error("config {file} is not .ron, .toml or .json")]
    UnsupportedFormat { file: PathBuf },

    #[error("config {file} is malformed: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Settings
// ===========================================================================

/// How the debug view renders each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugFormat {
    /// Glyph grid followed by the value list.
    #[default]
    Text,
    /// One JSON grid snapshot per tick.
    Json,
}

/// Settings for one program run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Show the grid before every tick.
    pub debug: bool,
    /// Wait for Enter after each debug view.
    pub pause: bool,
    /// Seed for the random operator. `None` picks one from the clock.
    pub seed: Option<u64>,
    pub debug_format: DebugFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            debug: false,
            pause: true,
            seed: None,
            debug_format: DebugFormat::Text,
        }
    }
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Config file syntax, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

pub fn detect_format(path: &Path) -> Result<Format, ConfigError> {
    let syntax = match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Format::Ron,
        Some("toml") => Format::Toml,
        Some("json") => Format::Json,
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                file: path.to_path_buf(),
            });
        }
    };
    Ok(syntax)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Parse any serde type from `path` in the syntax its extension names.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let syntax = detect_format(path)?;
    let text = std::fs::read_to_string(path)?;
    let parsed = match syntax {
        Format::Ron => ron::from_str(&text).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(&text).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(&text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|detail| ConfigError::Parse {
        file: path.to_path_buf(),
        detail,
    })
}

/// Load run settings from `path`.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let config: RunConfig = deserialize_file(path)?;
    log::debug!("loaded config from {}: {config:?}", path.display());
    Ok(config)
}
