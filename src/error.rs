use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("no syntax definition for language `{0}`")]
    UnknownLanguage(String),
    #[error("syntax highlighting failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// The diff is over the configured size limits; the caller should show a
/// plain summary instead of the split view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("split view skipped: {reason}")]
pub struct DiffTooLarge {
    pub reason: String,
}
