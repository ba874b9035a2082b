//! Split-view rendering: two fixed-width columns of gutter plus wrapped,
//! highlighted and tinted text, joined by a divider.

use tracing::debug;

use crate::cache::BoundedCache;
use crate::config::RenderConfig;
use crate::diff::{DiffStats, prepare_split_diff};
use crate::error::DiffTooLarge;
use crate::highlighting::{Highlighter, LineHighlighter};
use crate::inline::{LineSpans, row_spans};
use crate::models::{DiffLine, DiffSpan, RowKind, SplitDiffRow};
use crate::palette::DiffPalette;
use crate::text::{fit_to_width, truncate_to_width, visible_width};
use crate::theme::{DiffTheme, ThemeColor};
use crate::wrap::{blank_area, paint_segment, wrap_line};

const MIN_NUMBER_WIDTH: usize = 3;
/// Marker, space after the number, divider and the space after it.
const GUTTER_EXTRA: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Add,
    Remove,
    Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

fn line_kind(row: RowKind, side: Side) -> LineKind {
    match (row, side) {
        (RowKind::Changed | RowKind::Removed, Side::Left) => LineKind::Remove,
        (RowKind::Changed | RowKind::Added, Side::Right) => LineKind::Add,
        _ => LineKind::Context,
    }
}

/// Column widths for one render width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    left_width: usize,
    right_width: usize,
    number_width: usize,
}

impl Layout {
    fn new(width: usize, number_width: usize) -> Self {
        let content = width.saturating_sub(1);
        let left_width = content / 2;
        Layout {
            left_width,
            right_width: content - left_width,
            number_width,
        }
    }

    fn text_width(&self, column_width: usize) -> usize {
        column_width
            .saturating_sub(self.number_width + GUTTER_EXTRA)
            .max(1)
    }
}

/// A parsed diff bound to a theme and a highlighter, rendered on demand.
///
/// Parsing, span computation and palette resolution happen once in
/// [`SplitDiffView::new`]; [`SplitDiffView::render`] caches its output per
/// width until [`SplitDiffView::invalidate`] is called.
pub struct SplitDiffView {
    rows: Vec<SplitDiffRow>,
    spans: Vec<LineSpans>,
    theme: Box<dyn DiffTheme>,
    palette: DiffPalette,
    highlighter: LineHighlighter,
    max_rows: usize,
    number_width: usize,
    rendered: BoundedCache<usize, Vec<String>>,
}

impl SplitDiffView {
    /// Parse `diff_text` for split rendering.
    ///
    /// # Errors
    ///
    /// Returns [`DiffTooLarge`] when the text is over the configured limits.
    /// Nothing is parsed in that case; show [`plain_summary`] instead.
    pub fn new(
        diff_text: &str,
        theme: Box<dyn DiffTheme>,
        highlighter: Box<dyn Highlighter>,
        language: Option<String>,
        config: &RenderConfig,
    ) -> Result<Self, DiffTooLarge> {
        let rows = prepare_split_diff(diff_text, &config.limits)?;
        let spans = rows.iter().map(row_spans).collect();
        let palette = DiffPalette::resolve(theme.as_ref());
        let number_width = number_width(&rows);

        Ok(SplitDiffView {
            rows,
            spans,
            theme,
            palette,
            highlighter: LineHighlighter::new(highlighter, language, config.highlight_cache_size),
            max_rows: config.max_rows,
            number_width,
            rendered: BoundedCache::new(config.row_cache_size),
        })
    }

    pub fn rows(&self) -> &[SplitDiffRow] {
        &self.rows
    }

    pub fn spans(&self) -> &[LineSpans] {
        &self.spans
    }

    pub fn palette(&self) -> &DiffPalette {
        &self.palette
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop cached output and cached highlighting.
    pub fn invalidate(&mut self) {
        self.rendered.clear();
        self.highlighter.clear();
    }

    /// Swap the diff colors. Syntax colors belong to the highlighter; pass a
    /// matching one to [`SplitDiffView::set_highlighter`] as well when it
    /// depends on the theme, as [`SyntectHighlighter`] does.
    ///
    /// [`SyntectHighlighter`]: crate::highlighting::SyntectHighlighter
    pub fn set_theme(&mut self, theme: Box<dyn DiffTheme>) {
        self.palette = DiffPalette::resolve(theme.as_ref());
        self.theme = theme;
        self.invalidate();
    }

    pub fn set_highlighter(&mut self, highlighter: Box<dyn Highlighter>) {
        self.highlighter.replace(highlighter);
        self.rendered.clear();
    }

    /// Terminal lines for the view, each exactly `width` columns wide.
    pub fn render(&mut self, width: usize) -> Vec<String> {
        if let Some(lines) = self.rendered.get(&width) {
            return lines.clone();
        }
        let lines = self.build(width);
        debug!(width, lines = lines.len(), rows = self.rows.len(), "rendered split diff");
        self.rendered.insert(width, lines.clone());
        lines
    }

    fn build(&mut self, width: usize) -> Vec<String> {
        let layout = Layout::new(width, self.number_width);
        let mut painter = RowPainter {
            theme: self.theme.as_ref(),
            palette: &self.palette,
            highlighter: &mut self.highlighter,
            layout,
        };

        let mut out = vec![fit_to_width(&painter.header(), width)];
        let divider = painter.theme.fg(ThemeColor::Border, "│");

        for (row, spans) in self.rows.iter().zip(&self.spans).take(self.max_rows) {
            let left = painter.column(
                row.left(),
                line_kind(row.kind(), Side::Left),
                spans.left,
                layout.left_width,
            );
            let right = painter.column(
                row.right(),
                line_kind(row.kind(), Side::Right),
                spans.right,
                layout.right_width,
            );
            let (left, right) = painter.balance(left, right, row);
            for (l, r) in left.iter().zip(&right) {
                out.push(fit_to_width(&format!("{l}{divider}{r}"), width));
            }
        }

        if self.rows.len() > self.max_rows {
            let hidden = self.rows.len() - self.max_rows;
            let trailer = painter.theme.dim(&format!("… +{hidden} more rows"));
            out.push(fit_to_width(&trailer, width));
        }
        out
    }
}

/// Per-render borrow of the view's parts.
struct RowPainter<'a> {
    theme: &'a dyn DiffTheme,
    palette: &'a DiffPalette,
    highlighter: &'a mut LineHighlighter,
    layout: Layout,
}

impl RowPainter<'_> {
    fn header(&self) -> String {
        let rule = |label: &str, width: usize| {
            let head = format!("─ {label} ");
            let fill = width.saturating_sub(visible_width(&head));
            truncate_to_width(&format!("{head}{}", "─".repeat(fill)), width)
        };
        self.theme.fg(
            ThemeColor::Border,
            &format!(
                "{}┬{}",
                rule("old", self.layout.left_width),
                rule("new", self.layout.right_width)
            ),
        )
    }

    fn row_bg(&self, kind: LineKind) -> Option<&str> {
        match kind {
            LineKind::Add => Some(self.palette.row_add.as_str()),
            LineKind::Remove => Some(self.palette.row_remove.as_str()),
            LineKind::Context => None,
        }
    }

    fn emphasis_bg(&self, kind: LineKind) -> Option<&str> {
        match kind {
            LineKind::Add => Some(self.palette.emphasis_add.as_str()),
            LineKind::Remove => Some(self.palette.emphasis_remove.as_str()),
            LineKind::Context => None,
        }
    }

    fn gutter(&self, kind: LineKind, number: Option<u32>, first: bool) -> String {
        let width = self.layout.number_width;
        let blank = " ".repeat(width);
        let (marker, number) = if first {
            let marker = match kind {
                LineKind::Add => self.theme.fg(ThemeColor::DiffAdded, "+"),
                LineKind::Remove => self.theme.fg(ThemeColor::DiffRemoved, "-"),
                LineKind::Context => " ".to_string(),
            };
            let number = match number {
                Some(n) => self.theme.fg(ThemeColor::LineNumber, &format!("{n:>width$}")),
                None => blank,
            };
            (marker, number)
        } else {
            (" ".to_string(), blank)
        };
        let divider = self.theme.dim(&self.theme.fg(ThemeColor::Border, "│"));
        format!("{marker}{number} {divider} ")
    }

    /// Physical lines for one side of a row, each `column_width` wide.
    fn column(
        &mut self,
        line: Option<&DiffLine>,
        kind: LineKind,
        span: Option<DiffSpan>,
        column_width: usize,
    ) -> Vec<String> {
        let text_width = self.layout.text_width(column_width);
        let Some(line) = line else {
            let blank = format!(
                "{}{}",
                self.gutter(LineKind::Context, None, false),
                blank_area(None, text_width)
            );
            return vec![fit_to_width(&blank, column_width)];
        };

        let row_bg = self.row_bg(kind).map(str::to_string);
        let emphasis_bg = self.emphasis_bg(kind).map(str::to_string);

        wrap_line(&line.line, text_width)
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                let highlighted = self.highlighter.highlight(&segment.text);
                let emphasis = match (span, emphasis_bg.as_deref()) {
                    (Some(span), Some(bg)) => segment.local_span(span).map(|local| (local, bg)),
                    _ => None,
                };
                let body = paint_segment(&highlighted, row_bg.as_deref(), emphasis, text_width);
                let gutter = self.gutter(kind, line.line_number, i == 0);
                fit_to_width(&format!("{gutter}{body}"), column_width)
            })
            .collect()
    }

    /// Pad the shorter side with filler lines tinted like that side.
    fn balance(
        &self,
        mut left: Vec<String>,
        mut right: Vec<String>,
        row: &SplitDiffRow,
    ) -> (Vec<String>, Vec<String>) {
        let height = left.len().max(right.len());
        let filler = |side: Side, present: bool, column_width: usize| {
            let bg = if present {
                self.row_bg(line_kind(row.kind(), side))
            } else {
                None
            };
            let text_width = self.layout.text_width(column_width);
            let gutter = self.gutter(LineKind::Context, None, false);
            fit_to_width(&format!("{gutter}{}", blank_area(bg, text_width)), column_width)
        };

        let left_fill = filler(Side::Left, row.left().is_some(), self.layout.left_width);
        left.resize(height, left_fill);
        let right_fill = filler(Side::Right, row.right().is_some(), self.layout.right_width);
        right.resize(height, right_fill);
        (left, right)
    }
}

fn number_width(rows: &[SplitDiffRow]) -> usize {
    rows.iter()
        .flat_map(|row| [row.left(), row.right()])
        .flatten()
        .filter_map(|line| line.line_number)
        .map(|n| n.to_string().len())
        .max()
        .unwrap_or(0)
        .max(MIN_NUMBER_WIDTH)
}

/// Fallback shown instead of the split view for oversized diffs: the reason
/// and the added/removed counts, each line fitted to `width`.
pub fn plain_summary(text: &str, reason: &str, theme: &dyn DiffTheme, width: usize) -> Vec<String> {
    let stats = DiffStats::from_text(text);
    let counts = format!(
        "{} {}",
        theme.fg(ThemeColor::DiffAdded, &format!("+{}", stats.added)),
        theme.fg(ThemeColor::DiffRemoved, &format!("-{}", stats.removed)),
    );
    vec![
        fit_to_width(&theme.fg(ThemeColor::Warning, reason), width),
        fit_to_width(&counts, width),
    ]
}
