//! Parsing of numbered diff text into split-view rows.
//!
//! Input lines look like `-  12 old text`, `+  12 new text` or `   13 context`:
//! a prefix, an optional line number, one separating whitespace character and
//! the content. Anything else (hunk headers, file headers, blank lines) is
//! skipped. Plain `git diff` output is read by [`parse_unified_diff`], which
//! takes line numbers from the hunk headers.

use std::path::Path;

use tracing::{debug, info};

use crate::config::SizeLimits;
use crate::error::DiffTooLarge;
use crate::models::{DiffLine, DiffPrefix, SplitDiffRow};
use crate::text::sanitize_line;

/// Split one input line into prefix, optional line number and raw content.
///
/// Equivalent to matching `^([+\- ])(\s*\d*)\s(.*)$`: when the digits are not
/// followed by whitespace they are part of the content and the number is
/// absent.
pub fn parse_diff_line(line: &str) -> Option<(DiffPrefix, Option<u32>, &str)> {
    let prefix = match line.as_bytes().first()? {
        b'+' => DiffPrefix::Added,
        b'-' => DiffPrefix::Removed,
        b' ' => DiffPrefix::Context,
        _ => return None,
    };
    let rest = &line[1..];
    let ws_len = rest.len() - rest.trim_start().len();
    let after_ws = &rest[ws_len..];

    let digits_len = after_ws.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len > 0 {
        let after_digits = &after_ws[digits_len..];
        match after_digits.chars().next() {
            Some(sep) if sep.is_whitespace() => {
                let number = after_ws[..digits_len].parse::<u32>().ok();
                return Some((prefix, number, &after_digits[sep.len_utf8()..]));
            }
            _ => {}
        }
    }

    if ws_len == 0 {
        return None;
    }
    Some((prefix, None, after_ws))
}

/// Parse numbered diff text into rows, in input order.
pub fn parse_split_diff(text: &str) -> Vec<SplitDiffRow> {
    let mut builder = RowBuilder::default();
    let mut skipped = 0usize;
    for raw in text.split('\n') {
        match parse_diff_line(raw) {
            Some((prefix, number, content)) => builder.push(prefix, number, content),
            None => skipped += 1,
        }
    }
    let rows = builder.finish();
    debug!(rows = rows.len(), skipped, "parsed split diff");
    rows
}

/// Check the size limits, then parse. Over-limit input is never parsed.
///
/// Git unified diffs go through [`parse_unified_diff`] so hunk headers seed
/// both line cursors; anything else is read as numbered lines.
pub fn prepare_split_diff(
    text: &str,
    limits: &SizeLimits,
) -> Result<Vec<SplitDiffRow>, DiffTooLarge> {
    check_size(text, limits)?;
    if looks_like_unified_diff(text) {
        Ok(parse_unified_diff(text))
    } else {
        Ok(parse_split_diff(text))
    }
}

pub fn check_size(text: &str, limits: &SizeLimits) -> Result<(), DiffTooLarge> {
    let chars = text.chars().count();
    if chars > limits.max_chars {
        let reason = format!("diff is {chars} characters (limit {})", limits.max_chars);
        info!(%reason, "diff over size limit");
        return Err(DiffTooLarge { reason });
    }
    let lines = text.lines().count();
    if lines > limits.max_lines {
        let reason = format!("diff has {lines} lines (limit {})", limits.max_lines);
        info!(%reason, "diff over size limit");
        return Err(DiffTooLarge { reason });
    }
    Ok(())
}

/// Accumulates rows while tracking the old and new line cursors.
#[derive(Default)]
struct RowBuilder {
    rows: Vec<SplitDiffRow>,
    pending_left: Vec<DiffLine>,
    pending_right: Vec<DiffLine>,
    old_cursor: Option<u32>,
    new_cursor: Option<u32>,
}

impl RowBuilder {
    fn push(&mut self, prefix: DiffPrefix, number: Option<u32>, content: &str) {
        let line = sanitize_line(content);
        match prefix {
            DiffPrefix::Removed => {
                let expected = next(self.old_cursor);
                let line_number = number.or(expected);
                // A hunk opening with removals still moves the new side
                self.new_cursor = advance(self.new_cursor, jump(line_number, expected));
                if line_number.is_some() {
                    self.old_cursor = line_number;
                }
                self.pending_left.push(DiffLine {
                    prefix,
                    line,
                    line_number,
                });
            }
            DiffPrefix::Added => {
                let expected = next(self.new_cursor);
                let line_number = number.or(expected);
                // Removals in this run already carried the old side across
                if self.pending_left.is_empty() {
                    self.old_cursor = advance(self.old_cursor, jump(line_number, expected));
                }
                if line_number.is_some() {
                    self.new_cursor = line_number;
                }
                self.pending_right.push(DiffLine {
                    prefix,
                    line,
                    line_number,
                });
            }
            DiffPrefix::Context => {
                self.flush();
                let expected_old = next(self.old_cursor);
                let left_number = number.or(expected_old);
                let right_number = match self.new_cursor {
                    Some(new) => {
                        // Follow any jump in old numbering (a gap between hunks)
                        let gap = match (left_number, expected_old) {
                            (Some(left), Some(expected)) => i64::from(left) - i64::from(expected),
                            _ => 0,
                        };
                        u32::try_from(i64::from(new) + 1 + gap)
                            .ok()
                            .filter(|n| *n > 0)
                            .or(left_number)
                    }
                    None => left_number,
                };
                if left_number.is_some() {
                    self.old_cursor = left_number;
                }
                if right_number.is_some() {
                    self.new_cursor = right_number;
                }
                self.rows.push(SplitDiffRow::Context {
                    left: DiffLine {
                        prefix,
                        line: line.clone(),
                        line_number: left_number,
                    },
                    right: DiffLine {
                        prefix,
                        line,
                        line_number: right_number,
                    },
                });
            }
        }
    }

    /// Pair buffered removals and additions positionally.
    fn flush(&mut self) {
        let mut lefts = std::mem::take(&mut self.pending_left).into_iter();
        let mut rights = std::mem::take(&mut self.pending_right).into_iter();
        loop {
            let row = match (lefts.next(), rights.next()) {
                (Some(left), Some(right)) => SplitDiffRow::Changed { left, right },
                (Some(left), None) => SplitDiffRow::Removed { left },
                (None, Some(right)) => SplitDiffRow::Added { right },
                (None, None) => break,
            };
            self.rows.push(row);
        }
    }

    /// Start a hunk whose first old and new lines are `old_start` and
    /// `new_start`.
    fn seed(&mut self, old_start: u32, new_start: u32) {
        self.flush();
        self.old_cursor = Some(old_start.saturating_sub(1));
        self.new_cursor = Some(new_start.saturating_sub(1));
    }

    fn finish(mut self) -> Vec<SplitDiffRow> {
        self.flush();
        self.rows
    }
}

fn next(cursor: Option<u32>) -> Option<u32> {
    cursor.map(|n| n.saturating_add(1))
}

/// How far `number` skips past `expected`; zero when it does not.
fn jump(number: Option<u32>, expected: Option<u32>) -> u32 {
    match (number, expected) {
        (Some(number), Some(expected)) => number.saturating_sub(expected),
        _ => 0,
    }
}

fn advance(cursor: Option<u32>, by: u32) -> Option<u32> {
    cursor.map(|n| n.saturating_add(by))
}

/// Added/removed line counts, used for the plain fallback summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

impl DiffStats {
    pub fn from_text(text: &str) -> Self {
        let mut stats = DiffStats::default();
        for line in text.lines() {
            if line.starts_with("+++") || line.starts_with("---") {
                continue;
            }
            if line.starts_with('+') {
                stats.added += 1;
            } else if line.starts_with('-') {
                stats.removed += 1;
            }
        }
        stats
    }
}

/// Whether `text` is a git-style unified diff with `@@` hunk headers.
pub fn looks_like_unified_diff(text: &str) -> bool {
    text.lines().any(|line| line.starts_with("@@ -"))
}

/// One meaningful line of a git unified diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnifiedLine<'a> {
    Hunk { old_start: u32, new_start: u32 },
    Line {
        prefix: DiffPrefix,
        number: u32,
        content: &'a str,
    },
}

/// Walk the hunks of a unified diff, numbering each line. Removed and
/// context lines get their old-file number, added lines their new-file
/// number. File headers and `\ No newline` markers are dropped.
fn unified_lines(text: &str) -> Vec<UnifiedLine<'_>> {
    let mut out = Vec::new();
    let mut old_line = 0u32;
    let mut new_line = 0u32;
    let mut in_hunk = false;

    for line in text.lines() {
        if line.starts_with("@@") {
            match parse_hunk_header(line) {
                Some((old_start, new_start)) => {
                    old_line = old_start;
                    new_line = new_start;
                    in_hunk = true;
                    out.push(UnifiedLine::Hunk {
                        old_start,
                        new_start,
                    });
                }
                None => in_hunk = false,
            }
            continue;
        }
        if line.starts_with("diff ") {
            in_hunk = false;
            continue;
        }
        if !in_hunk || line.starts_with('\\') {
            continue;
        }

        let (prefix, number, content) = if let Some(content) = line.strip_prefix('+') {
            new_line += 1;
            (DiffPrefix::Added, new_line - 1, content)
        } else if let Some(content) = line.strip_prefix('-') {
            old_line += 1;
            (DiffPrefix::Removed, old_line - 1, content)
        } else {
            old_line += 1;
            new_line += 1;
            let content = line.strip_prefix(' ').unwrap_or(line);
            (DiffPrefix::Context, old_line - 1, content)
        };
        out.push(UnifiedLine::Line {
            prefix,
            number,
            content,
        });
    }
    out
}

/// Rewrite a unified diff into numbered lines.
///
/// The hunk headers are not carried over; use [`parse_unified_diff`] when
/// the new-side numbers must be exact for hunks that open with removals.
pub fn annotate_unified_diff(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for line in unified_lines(text) {
        if let UnifiedLine::Line {
            prefix,
            number,
            content,
        } = line
        {
            let marker = match prefix {
                DiffPrefix::Added => '+',
                DiffPrefix::Removed => '-',
                DiffPrefix::Context => ' ',
            };
            out.push_str(&format!("{marker}{number} {content}\n"));
        }
    }
    out
}

/// Parse a git unified diff into rows. Each hunk header seeds both line
/// cursors, so context lines get exact numbers on both sides.
pub fn parse_unified_diff(text: &str) -> Vec<SplitDiffRow> {
    let mut builder = RowBuilder::default();
    for line in unified_lines(text) {
        match line {
            UnifiedLine::Hunk {
                old_start,
                new_start,
            } => builder.seed(old_start, new_start),
            UnifiedLine::Line {
                prefix,
                number,
                content,
            } => builder.push(prefix, Some(number), content),
        }
    }
    let rows = builder.finish();
    debug!(rows = rows.len(), "parsed unified diff");
    rows
}

/// `@@ -12,3 +14,5 @@ ...` -> `(12, 14)`
fn parse_hunk_header(header: &str) -> Option<(u32, u32)> {
    let mut parts = header.split_whitespace().skip(1);
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;
    let start = |range: &str| range.split(',').next()?.parse::<u32>().ok();
    Some((start(old)?, start(new)?))
}

/// Path of the new file from a `+++ b/path` header.
pub fn target_path(text: &str) -> Option<String> {
    let header = text.lines().find_map(|line| line.strip_prefix("+++ "))?;
    let path = header.split('\t').next()?.trim();
    if path == "/dev/null" || path.is_empty() {
        return None;
    }
    Some(path.strip_prefix("b/").unwrap_or(path).to_string())
}

/// File extension, used as the highlighter language.
pub fn language_from_path(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_string)
}



#[cfg(test)]
mod unified_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GIT_DIFF: &str = r#"diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -10,3 +10,4 @@ fn main() {
 context
-removed
+added1
+added2
\ No newline at end of file
@@ -40,2 +41,2 @@
 later
-old
+new
"#;

    #[test]
    fn test_detects_unified_diff() {
        assert!(looks_like_unified_diff(GIT_DIFF));
        assert!(!looks_like_unified_diff("- 1 a\n+ 1 b\n"));
    }

    #[test]
    fn test_annotate_numbers_lines() {
        let annotated = annotate_unified_diff(GIT_DIFF);
        assert_eq!(
            annotated,
            " 10 context\n-11 removed\n+11 added1\n+12 added2\n 40 later\n-41 old\n+42 new\n"
        );
    }

    #[test]
    fn test_annotated_diff_parses_with_new_numbers() {
        let rows = parse_split_diff(&annotate_unified_diff(GIT_DIFF));
        assert_eq!(rows.len(), 5);
        // "later" sits at old 40 / new 41 after the extra added line
        let later = &rows[3];
        assert_eq!(later.left().unwrap().line_number, Some(40));
        assert_eq!(later.right().unwrap().line_number, Some(41));
        assert_eq!(rows[4].right().unwrap().line_number, Some(42));
    }

    #[test]
    fn test_hunk_opening_with_removal_keeps_new_numbers() {
        let text = "--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n a\n-b\n+B\n@@ -40,2 +40,1 @@\n-x\n y\n";
        let annotated = annotate_unified_diff(text);
        assert_eq!(annotated, " 1 a\n-2 b\n+2 B\n-40 x\n 41 y\n");

        for rows in [parse_split_diff(&annotated), parse_unified_diff(text)] {
            let last = rows.last().unwrap();
            assert_eq!(last.left().unwrap().line_number, Some(41));
            assert_eq!(last.right().unwrap().line_number, Some(40));
        }
    }

    #[test]
    fn test_first_hunk_seeds_new_numbers() {
        let text = "@@ -10,2 +10,1 @@\n-x\n y\n";
        let rows = parse_unified_diff(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].left().unwrap().line_number, Some(10));
        assert_eq!(rows[1].left().unwrap().line_number, Some(11));
        assert_eq!(rows[1].right().unwrap().line_number, Some(10));

        let prepared = prepare_split_diff(text, &SizeLimits::default()).unwrap();
        assert_eq!(prepared, rows);
    }

    #[test]
    fn test_prepare_reads_git_diff_directly() {
        let rows = prepare_split_diff(GIT_DIFF, &SizeLimits::default()).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].right().unwrap().line_number, Some(10));
        assert_eq!(rows[3].left().unwrap().line_number, Some(40));
        assert_eq!(rows[3].right().unwrap().line_number, Some(41));
        assert_eq!(rows[4].left().unwrap().line, "old");
    }

    #[test]
    fn test_target_path_and_language() {
        assert_eq!(target_path(GIT_DIFF).as_deref(), Some("src/main.rs"));
        assert_eq!(language_from_path("src/main.rs").as_deref(), Some("rs"));
        assert_eq!(target_path("+++ /dev/null\n"), None);
        assert_eq!(language_from_path("Makefile"), None);
    }
}
