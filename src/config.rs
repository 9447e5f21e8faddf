use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parser::NoiseRules;

/// Looked up in the current directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "outline.toml";

/// On-disk TOML configuration. Every table is optional; missing keys take
/// their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub noise: NoiseRules,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Titles longer than this are truncated in outlines.
    pub title_width: usize,
    /// Characters of content shown per section in detailed outlines.
    pub preview_chars: usize,
    pub max_depth: Option<usize>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title_width: 60,
            preview_chars: 100,
            max_depth: None,
        }
    }
}

impl Config {
    /// Load `path` if given, else `outline.toml` from the current directory if
    /// present, else defaults. An explicit path must exist; a malformed file is
    /// an error either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => {
                let cwd = PathBuf::from(DEFAULT_CONFIG_FILE);
                if cwd.exists() {
                    Self::from_path(&cwd)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
