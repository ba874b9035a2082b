//! Width measurement, padding and background painting for strings that carry
//! ANSI escape sequences.
//!
//! Every function walks the input through [`pieces`], which splits it into
//! complete CSI sequences and visible characters. Sequences never count toward
//! width or character offsets and are always re-emitted verbatim.

use unicode_width::UnicodeWidthChar;

const ESC: char = '\x1b';
const TAB_SPACES: &str = "    ";

/// One unit of an escape-laden string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    /// A complete CSI sequence, e.g. `\x1b[38;2;1;2;3m`.
    Escape(&'a str),
    /// A visible character (or a stray control character).
    Char(char),
}

/// Iterator over the [`Piece`]s of a string.
pub struct Pieces<'a> {
    text: &'a str,
    pos: usize,
}

/// Split `text` into escape sequences and visible characters.
pub fn pieces(text: &str) -> Pieces<'_> {
    Pieces { text, pos: 0 }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Piece<'a>> {
        let rest = &self.text[self.pos..];
        let ch = rest.chars().next()?;
        if ch == ESC {
            if let Some(len) = csi_len(rest) {
                self.pos += len;
                return Some(Piece::Escape(&rest[..len]));
            }
        }
        self.pos += ch.len_utf8();
        Some(Piece::Char(ch))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CsiState {
    Params,
    Intermediate,
}

/// Byte length of the CSI sequence starting at `s`, or `None` when `s` does
/// not start with one or the sequence is cut short.
fn csi_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != 0x1b || bytes[1] != b'[' {
        return None;
    }
    let mut state = CsiState::Params;
    for (i, &b) in bytes.iter().enumerate().skip(2) {
        match b {
            0x30..=0x3f if state == CsiState::Params => {}
            0x20..=0x2f => state = CsiState::Intermediate,
            0x40..=0x7e => return Some(i + 1),
            _ => return None,
        }
    }
    None
}

pub(crate) fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Remove all CSI sequences. Only meant for measuring.
pub fn strip_escape_sequences(text: &str) -> String {
    pieces(text)
        .filter_map(|piece| match piece {
            Piece::Char(ch) => Some(ch),
            Piece::Escape(_) => None,
        })
        .collect()
}

/// Display width in terminal columns, ignoring escape sequences.
pub fn visible_width(text: &str) -> usize {
    pieces(text)
        .map(|piece| match piece {
            Piece::Char(ch) => char_width(ch),
            Piece::Escape(_) => 0,
        })
        .sum()
}

/// Calculate padding needed to reach visual width.
/// Returns number of spaces needed.
pub fn calculate_padding(current_text: &str, target_width: usize) -> usize {
    target_width.saturating_sub(visible_width(current_text))
}

/// Truncate to at most `max_width` visible columns.
///
/// Never splits a wide character or an escape sequence. Sequences that follow
/// the cut point are kept so the string still ends in the same SGR state.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut result = String::with_capacity(text.len());
    let mut current_width = 0;
    let mut truncated = false;

    for piece in pieces(text) {
        match piece {
            Piece::Escape(seq) => result.push_str(seq),
            Piece::Char(_) if truncated => {}
            Piece::Char(ch) => {
                let w = char_width(ch);
                if current_width + w > max_width {
                    truncated = true;
                    continue;
                }
                result.push(ch);
                current_width += w;
            }
        }
    }

    result
}

/// Pad with spaces until the visible width reaches `width`. Wider input is
/// returned unchanged.
pub fn pad_right(text: &str, width: usize) -> String {
    let padding = calculate_padding(text, width);
    let mut out = String::with_capacity(text.len() + padding);
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', padding));
    out
}

/// Truncate then pad so the visible width is exactly `width`.
pub fn fit_to_width(text: &str, width: usize) -> String {
    pad_right(&truncate_to_width(text, width), width)
}

/// Paint visible characters `[start, end)` with `on_color`, switching to
/// `off_color` once the range is left.
///
/// Indices count visible characters. While inside the range, any sequence that
/// clears the background (a reset from a highlighter, say) is followed by
/// `on_color` again so the emphasis survives.
pub fn apply_background_to_visible_range(
    text: &str,
    start: usize,
    end: usize,
    on_color: &str,
    off_color: &str,
) -> String {
    if start >= end {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + on_color.len() + off_color.len());
    let mut index = 0;
    let mut inside = false;

    for piece in pieces(text) {
        match piece {
            Piece::Escape(seq) => {
                out.push_str(seq);
                if inside && resets_background(seq) {
                    out.push_str(on_color);
                }
            }
            Piece::Char(ch) => {
                if inside && index == end {
                    out.push_str(off_color);
                    inside = false;
                }
                if index == start {
                    out.push_str(on_color);
                    inside = true;
                }
                out.push(ch);
                index += 1;
            }
        }
    }

    if inside {
        out.push_str(off_color);
    }
    out
}

/// Re-apply `row_bg` right after every full reset or background reset found
/// in `text`.
pub fn keep_background_across_resets(text: &str, row_bg: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for piece in pieces(text) {
        match piece {
            Piece::Escape(seq) => {
                out.push_str(seq);
                if resets_background(seq) {
                    out.push_str(row_bg);
                }
            }
            Piece::Char(ch) => out.push(ch),
        }
    }
    out
}

/// Whether an SGR sequence clears the background color, either through a
/// full reset (`0` or an empty parameter list) or `49`.
///
/// The arguments of extended colors (`38;5;0`, `48;2;0;0;0`) are skipped so a
/// zero channel is not mistaken for a reset.
pub fn resets_background(seq: &str) -> bool {
    let Some(params) = seq
        .strip_prefix("\x1b[")
        .and_then(|rest| rest.strip_suffix('m'))
    else {
        return false;
    };
    if params.is_empty() {
        return true;
    }

    let codes: Vec<&str> = params.split(';').collect();
    let mut i = 0;
    while i < codes.len() {
        let code = if codes[i].is_empty() {
            Some(0)
        } else {
            codes[i].parse::<u16>().ok()
        };
        match code {
            Some(0) | Some(49) => return true,
            Some(38) | Some(48) => {
                i += match codes.get(i + 1) {
                    Some(&"5") => 3,
                    Some(&"2") => 5,
                    _ => 1,
                };
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    false
}

/// Expand tabs to four spaces and drop every other control character.
pub fn sanitize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for ch in line.chars() {
        if ch == '\t' {
            out.push_str(TAB_SPACES);
        } else if !ch.is_control() {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RED: &str = "\x1b[31m";
    const RESET: &str = "\x1b[0m";
    const ON: &str = "\x1b[48;2;1;1;1m";
    const OFF: &str = "\x1b[48;2;9;9;9m";

    #[test]
    fn test_strip_removes_sgr_and_other_csi() {
        let text = format!("{RED}abc{RESET}\x1b[2Kdef");
        assert_eq!(strip_escape_sequences(&text), "abcdef");
    }

    #[test]
    fn test_strip_keeps_truncated_sequence_as_literal() {
        let text = "abc\x1b[31";
        assert_eq!(strip_escape_sequences(text), text);
    }

    #[test]
    fn test_lone_escape_is_literal() {
        let collected: Vec<Piece<'_>> = pieces("\x1bx").collect();
        assert_eq!(collected, vec![Piece::Char('\x1b'), Piece::Char('x')]);
    }

    #[test]
    fn test_visible_width_ignores_escapes() {
        assert_eq!(visible_width(&format!("{RED}Hello{RESET}")), 5);
    }

    #[test]
    fn test_visible_width_wide_chars() {
        assert_eq!(visible_width("你好"), 4);
        assert_eq!(visible_width(&format!("Hi{RED}🎉{RESET}")), 4);
    }

    #[test]
    fn test_truncate_to_width_ascii() {
        let text = "Hello World";
        assert_eq!(truncate_to_width(text, 5), "Hello");
        assert_eq!(truncate_to_width(text, 11), "Hello World");
        assert_eq!(truncate_to_width(text, 0), "");
    }

    #[test]
    fn test_truncate_to_width_cjk() {
        let text = "你好世界";
        assert_eq!(truncate_to_width(text, 5), "你好");
        assert_eq!(truncate_to_width(text, 3), "你");
    }

    #[test]
    fn test_truncate_keeps_trailing_escapes() {
        let text = format!("{RED}Hello{RESET}");
        assert_eq!(truncate_to_width(&text, 2), format!("{RED}He{RESET}"));
    }

    #[test]
    fn test_calculate_padding_wide_chars() {
        assert_eq!(calculate_padding("你好", 10), 6);
        assert_eq!(calculate_padding("你好", 2), 0);
    }

    #[test]
    fn test_pad_right_reaches_exact_width() {
        for text in ["", "abc", "你好", "\x1b[1mbold\x1b[22m", "e\u{0301}"] {
            let base = visible_width(&strip_escape_sequences(text));
            for width in base..base + 5 {
                let padded = pad_right(text, width);
                assert_eq!(visible_width(&strip_escape_sequences(&padded)), width);
            }
        }
    }

    #[test]
    fn test_fit_to_width_wide_char_at_boundary() {
        let fitted = fit_to_width("a你b", 2);
        assert_eq!(fitted, "a ");
        assert_eq!(visible_width(&fitted), 2);
    }

    #[test]
    fn test_fit_to_width_pads_short_text() {
        assert_eq!(fit_to_width(&format!("{RED}ab"), 4), format!("{RED}ab  "));
    }

    #[test]
    fn test_apply_background_wraps_range() {
        let out = apply_background_to_visible_range("abcXdef", 3, 4, ON, OFF);
        assert_eq!(out, format!("abc{ON}X{OFF}def"));
    }

    #[test]
    fn test_apply_background_skips_escapes_when_counting() {
        let text = format!("{RED}ab{RESET}cd");
        let out = apply_background_to_visible_range(&text, 1, 3, ON, OFF);
        assert_eq!(out, format!("{RED}a{ON}b{RESET}{ON}c{OFF}d"));
    }

    #[test]
    fn test_apply_background_range_to_end() {
        let out = apply_background_to_visible_range("abc", 1, 10, ON, OFF);
        assert_eq!(out, format!("a{ON}bc{OFF}"));
    }

    #[test]
    fn test_apply_background_empty_range_is_identity() {
        assert_eq!(apply_background_to_visible_range("abc", 2, 2, ON, OFF), "abc");
    }

    #[test]
    fn test_apply_background_preserves_visible_text() {
        let samples = [
            "plain text".to_string(),
            format!("{RED}let{RESET} x = \x1b[38;2;1;2;3m42{RESET};"),
            "你好 world".to_string(),
            "broken \x1b[3".to_string(),
        ];
        for text in &samples {
            let len = strip_escape_sequences(text).chars().count();
            for start in 0..=len {
                for end in start..=len + 1 {
                    let out = apply_background_to_visible_range(text, start, end, ON, OFF);
                    assert_eq!(strip_escape_sequences(&out), strip_escape_sequences(text));
                }
            }
        }
    }

    #[test]
    fn test_keep_background_after_resets() {
        let text = format!("{RED}fn{RESET} x\x1b[49m!");
        let out = keep_background_across_resets(&text, ON);
        assert_eq!(out, format!("{RED}fn{RESET}{ON} x\x1b[49m{ON}!"));
    }

    #[test]
    fn test_resets_background_detection() {
        assert!(resets_background("\x1b[0m"));
        assert!(resets_background("\x1b[m"));
        assert!(resets_background("\x1b[1;49m"));
        assert!(resets_background("\x1b[;31m"));
        assert!(!resets_background("\x1b[38;5;0m"));
        assert!(!resets_background("\x1b[48;2;0;0;0m"));
        assert!(!resets_background("\x1b[39m"));
        assert!(!resets_background("\x1b[2K"));
    }

    #[test]
    fn test_sanitize_line() {
        assert_eq!(sanitize_line("\tx\r\x1b[31my"), "    x[31my");
        assert_eq!(sanitize_line("héllo"), "héllo");
    }
}
