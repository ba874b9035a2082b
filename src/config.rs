//! Renderer configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::theme::Theme;

/// Thresholds above which the split view is skipped entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    pub max_chars: usize,
    pub max_lines: usize,
}

impl Default for SizeLimits {
    fn default() -> Self {
        SizeLimits {
            max_chars: 200_000,
            max_lines: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub theme: Theme,
    /// Rows rendered before the `+N more rows` trailer.
    pub max_rows: usize,
    pub limits: SizeLimits,
    pub highlight_cache_size: usize,
    /// Number of render widths kept.
    pub row_cache_size: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            theme: Theme::default(),
            max_rows: 500,
            limits: SizeLimits::default(),
            highlight_cache_size: 1_000,
            row_cache_size: 8,
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load from an explicit path. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the user config directory, or defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load_default() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// `$XDG_CONFIG_HOME/splitdiff/config.toml`, else `~/.config/splitdiff/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    let base = if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        Path::new(&home).join(".config")
    } else {
        return None;
    };

    Some(base.join("splitdiff").join("config.toml"))
}
