//! Side-by-side terminal diffs.
//!
//! [`SplitDiffView`] parses numbered diff text into rows, finds the changed
//! region of each modified line, and renders two fixed-width columns with
//! syntax highlighting and tinted backgrounds. All string handling is aware
//! of ANSI escape sequences.

pub mod cache;
pub mod color;
pub mod config;
pub mod diff;
pub mod error;
pub mod highlighting;
pub mod inline;
pub mod models;
pub mod palette;
pub mod render;
pub mod text;
pub mod theme;
pub mod wrap;

pub use config::{RenderConfig, SizeLimits};
pub use diff::{
    DiffStats, annotate_unified_diff, language_from_path, looks_like_unified_diff, parse_split_diff,
    parse_unified_diff, prepare_split_diff, target_path,
};
pub use error::{ConfigError, DiffTooLarge, HighlightError};
pub use highlighting::{Highlighter, LineHighlighter, SyntectHighlighter};
pub use inline::{LineSpans, compute_inline_spans};
pub use models::{DiffLine, DiffPrefix, DiffSpan, RowKind, SplitDiffRow};
pub use palette::DiffPalette;
pub use render::{SplitDiffView, plain_summary};
pub use theme::{DiffTheme, Theme, ThemeBg, ThemeColor};
