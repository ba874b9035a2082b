//! Wrapping of plain line text into fixed-width segments, and painting of the
//! highlighted segments with row and emphasis backgrounds.
//!
//! Segments keep their char offset into the original line, so an inline span
//! computed against the whole line can be mapped onto each segment with
//! [`Segment::local_span`].

use crate::models::DiffSpan;
use crate::text::{
    apply_background_to_visible_range, char_width, fit_to_width, keep_background_across_resets,
};

const RESET: &str = "\x1b[0m";
const BG_RESET: &str = "\x1b[49m";

/// A slice of a line produced by [`wrap_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// Char offset of the first character within the line.
    pub start: usize,
    /// Length in chars.
    pub len: usize,
}

impl Segment {
    /// Intersect a line-level span with this segment, in segment-local
    /// offsets. `None` when they do not overlap.
    pub fn local_span(&self, span: DiffSpan) -> Option<DiffSpan> {
        let start = span.start.max(self.start);
        let end = span.end.min(self.start + self.len);
        (start < end).then(|| DiffSpan {
            start: start - self.start,
            end: end - self.start,
        })
    }
}

/// Split `line` into segments no wider than `width` columns.
///
/// A break goes after the last space inside the window, so the space stays
/// with the earlier segment and the offsets of consecutive segments add up.
/// Without a usable space the window is cut mid-token. Every segment holds at
/// least one character, and an empty line yields one empty segment.
pub fn wrap_line(line: &str, width: usize) -> Vec<Segment> {
    let width = width.max(1);
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![Segment {
            text: String::new(),
            start: 0,
            len: 0,
        }];
    }

    let mut segments = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let mut end = start;
        let mut columns = 0;
        while end < chars.len() {
            let w = char_width(chars[end]);
            if columns + w > width {
                break;
            }
            columns += w;
            end += 1;
        }
        if end == start {
            // a glyph wider than the whole column
            end = start + 1;
        }

        if end < chars.len() {
            if let Some(space) = chars[start..end].iter().rposition(|&c| c == ' ') {
                if space > 0 {
                    end = start + space + 1;
                }
            }
        }

        segments.push(Segment {
            text: chars[start..end].iter().collect(),
            start,
            len: end - start,
        });
        start = end;
    }
    segments
}

/// Paint a highlighted segment into a text area exactly `width` columns wide.
///
/// With a row background, the background survives every reset the
/// highlighter emitted and covers the padding. The emphasis background, when
/// given, covers the span and hands back to the row background afterwards.
/// The result always ends with a full reset.
pub fn paint_segment(
    highlighted: &str,
    row_bg: Option<&str>,
    emphasis: Option<(DiffSpan, &str)>,
    width: usize,
) -> String {
    let mut body = match emphasis {
        Some((span, on)) => apply_background_to_visible_range(
            highlighted,
            span.start,
            span.end,
            on,
            row_bg.unwrap_or(BG_RESET),
        ),
        None => highlighted.to_string(),
    };

    match row_bg {
        Some(bg) => {
            body = keep_background_across_resets(&body, bg);
            format!("{bg}{}{RESET}", fit_to_width(&body, width))
        }
        None => format!("{}{RESET}", fit_to_width(&body, width)),
    }
}

/// An empty text area, tinted when `row_bg` is set.
pub fn blank_area(row_bg: Option<&str>, width: usize) -> String {
    paint_segment("", row_bg, None, width)
}
