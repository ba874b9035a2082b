//! Character-level change regions for changed line pairs.
//!
//! Only the common prefix and suffix are trimmed, so a line with several
//! separate edits gets one span covering all of them.

use crate::models::{DiffSpan, SplitDiffRow};

/// Emphasis spans for both sides of a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineSpans {
    pub left: Option<DiffSpan>,
    pub right: Option<DiffSpan>,
}

/// Spans of the differing middle of `old` and `new`.
///
/// Identical lines yield no spans. A side whose span would be empty (pure
/// insertion or deletion on the other side) gets `None`.
pub fn compute_inline_spans(old: &str, new: &str) -> LineSpans {
    if old == new {
        return LineSpans::default();
    }

    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    let prefix = old_chars
        .iter()
        .zip(&new_chars)
        .take_while(|(a, b)| a == b)
        .count();

    let max_suffix = old_chars.len().min(new_chars.len()) - prefix;
    let suffix = old_chars
        .iter()
        .rev()
        .zip(new_chars.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    LineSpans {
        left: span(prefix, old_chars.len() - suffix),
        right: span(prefix, new_chars.len() - suffix),
    }
}

fn span(start: usize, end: usize) -> Option<DiffSpan> {
    let span = DiffSpan { start, end };
    (!span.is_empty()).then_some(span)
}

/// Spans for a row; only changed rows get any.
pub fn row_spans(row: &SplitDiffRow) -> LineSpans {
    match row {
        SplitDiffRow::Changed { left, right } => compute_inline_spans(&left.line, &right.line),
        _ => LineSpans::default(),
    }
}
