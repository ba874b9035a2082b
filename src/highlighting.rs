use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;

use syntect::easy::HighlightLines;
use syntect::highlighting::{
    Color, FontStyle, ScopeSelectors, StyleModifier, Theme as SyntaxTheme, ThemeItem, ThemeSettings,
};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use tracing::{debug, warn};

use crate::cache::BoundedCache;
use crate::error::HighlightError;
use crate::text::strip_escape_sequences;
use crate::theme::Theme;

const RESET: &str = "\x1b[0m";

/// Turns one line of source text into ANSI-colored text.
///
/// The output must have the same visible characters as the input; only
/// escape sequences may be added.
pub trait Highlighter {
    fn highlight(&self, line: &str, language: &str) -> Result<String, HighlightError>;
}

/// Highlighter backed by syntect's bundled syntaxes.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme: SyntaxTheme,
}

impl SyntectHighlighter {
    pub fn new(theme: Theme) -> Self {
        let theme = if theme.is_dark() {
            create_alabaster_dark()
        } else {
            create_alabaster_light()
        };
        SyntectHighlighter {
            syntax_set: SyntaxSet::load_defaults_nonewlines(),
            theme,
        }
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, line: &str, language: &str) -> Result<String, HighlightError> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;

        let mut h = HighlightLines::new(syntax, &self.theme);
        let ranges = h.highlight_line(line, &self.syntax_set)?;
        Ok(format!("{}{RESET}", as_24_bit_terminal_escaped(&ranges, false)))
    }
}

fn create_alabaster_dark() -> SyntaxTheme {
    let palette = AlabasterPalette {
        bg: rgb(14, 20, 21),
        fg: rgb(206, 206, 206),
        comment: rgb(170, 55, 49),
        string: rgb(68, 140, 39),
        constant: rgb(122, 62, 157),
        // lighter than the light variant so it reads on dark rows
        definition: rgb(120, 160, 255),
    };
    build_alabaster_theme("Alabaster Dark", &palette)
}

fn create_alabaster_light() -> SyntaxTheme {
    let palette = AlabasterPalette {
        bg: rgb(247, 247, 247),
        fg: rgb(0, 0, 0),
        comment: rgb(170, 55, 49),
        string: rgb(68, 140, 39),
        constant: rgb(122, 62, 157),
        definition: rgb(50, 92, 192),
    };
    build_alabaster_theme("Alabaster Light", &palette)
}

struct AlabasterPalette {
    bg: Color,
    fg: Color,
    comment: Color,
    string: Color,
    constant: Color,
    definition: Color,
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color { r, g, b, a: 255 }
}

/// Alabaster leaves keywords unstyled; only comments, strings, constants,
/// definitions and punctuation get colors.
fn build_alabaster_theme(name: &str, palette: &AlabasterPalette) -> SyntaxTheme {
    let grey = rgb(119, 119, 119);
    let rules = [
        ("comment", palette.comment, FontStyle::empty()),
        ("string", palette.string, FontStyle::empty()),
        (
            "constant.numeric, constant.language, constant.character",
            palette.constant,
            FontStyle::empty(),
        ),
        (
            "entity.name, entity.name.function, entity.name.type",
            palette.definition,
            FontStyle::empty(),
        ),
        ("punctuation", grey, FontStyle::empty()),
        ("markup.heading", palette.fg, FontStyle::BOLD),
        ("markup.bold", palette.fg, FontStyle::BOLD),
    ];

    let scopes = rules
        .into_iter()
        .filter_map(|(selector, foreground, font_style)| {
            let scope = ScopeSelectors::from_str(selector).ok()?;
            Some(ThemeItem {
                scope,
                style: StyleModifier {
                    foreground: Some(foreground),
                    background: None,
                    font_style: Some(font_style),
                },
            })
        })
        .collect();

    SyntaxTheme {
        name: Some(name.to_string()),
        author: Some("Alabaster Port".to_string()),
        settings: ThemeSettings {
            background: Some(palette.bg),
            foreground: Some(palette.fg),
            caret: Some(palette.fg),
            ..ThemeSettings::default()
        },
        scopes,
    }
}

/// Highlighter guard used by the renderer.
///
/// Caches results per line and never fails: an error, a panic, or output
/// whose visible text differs from the input all degrade to the plain line.
pub struct LineHighlighter {
    highlighter: Box<dyn Highlighter>,
    language: Option<String>,
    cache: BoundedCache<String, String>,
}

impl LineHighlighter {
    pub fn new(
        highlighter: Box<dyn Highlighter>,
        language: Option<String>,
        cache_size: usize,
    ) -> Self {
        LineHighlighter {
            highlighter,
            language,
            cache: BoundedCache::new(cache_size),
        }
    }

    /// Swap the underlying highlighter and drop everything it produced.
    pub fn replace(&mut self, highlighter: Box<dyn Highlighter>) {
        self.highlighter = highlighter;
        self.cache.clear();
    }

    pub fn highlight(&mut self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let Some(language) = self.language.as_deref() else {
            return text.to_string();
        };
        if let Some(hit) = self.cache.get(text) {
            return hit.clone();
        }

        let highlighter = &self.highlighter;
        let outcome = catch_unwind(AssertUnwindSafe(|| highlighter.highlight(text, language)));
        let result = match outcome {
            Ok(Ok(colored)) if strip_escape_sequences(&colored) == text => colored,
            Ok(Ok(_)) => {
                debug!(language, "highlighter altered line text, using plain text");
                text.to_string()
            }
            Ok(Err(err)) => {
                debug!(language, error = %err, "highlighting failed, using plain text");
                text.to_string()
            }
            Err(_) => {
                warn!(language, "highlighter panicked, using plain text");
                text.to_string()
            }
        };

        self.cache.insert(text.to_string(), result.clone());
        result
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Failing;

    impl Highlighter for Failing {
        fn highlight(&self, _line: &str, language: &str) -> Result<String, HighlightError> {
            Err(HighlightError::UnknownLanguage(language.to_string()))
        }
    }

    struct Panicking;

    impl Highlighter for Panicking {
        fn highlight(&self, _line: &str, _language: &str) -> Result<String, HighlightError> {
            panic!("boom");
        }
    }

    struct Altering;

    impl Highlighter for Altering {
        fn highlight(&self, line: &str, _language: &str) -> Result<String, HighlightError> {
            Ok(format!("\x1b[31m{}\x1b[0m", line.to_uppercase()))
        }
    }

    struct Counting(Rc<Cell<usize>>);

    impl Highlighter for Counting {
        fn highlight(&self, line: &str, _language: &str) -> Result<String, HighlightError> {
            self.0.set(self.0.get() + 1);
            Ok(format!("\x1b[32m{line}\x1b[0m"))
        }
    }

    fn guarded(highlighter: impl Highlighter + 'static) -> LineHighlighter {
        LineHighlighter::new(Box::new(highlighter), Some("rs".to_string()), 16)
    }

    #[test]
    fn test_error_falls_back_to_plain() {
        assert_eq!(guarded(Failing).highlight("let x = 1;"), "let x = 1;");
    }

    #[test]
    fn test_panic_falls_back_to_plain() {
        assert_eq!(guarded(Panicking).highlight("fn main() {}"), "fn main() {}");
    }

    #[test]
    fn test_altered_text_is_rejected() {
        assert_eq!(guarded(Altering).highlight("abc"), "abc");
    }

    #[test]
    fn test_results_are_cached() {
        let calls = Rc::new(Cell::new(0));
        let mut lines = guarded(Counting(calls.clone()));
        let first = lines.highlight("x");
        let second = lines.highlight("x");
        assert_eq!(first, "\x1b[32mx\x1b[0m");
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);

        lines.clear();
        lines.highlight("x");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_replace_drops_cached_output() {
        let mut lines = guarded(Counting(Rc::new(Cell::new(0))));
        assert_eq!(lines.highlight("x"), "\x1b[32mx\x1b[0m");
        lines.replace(Box::new(Failing));
        assert_eq!(lines.highlight("x"), "x");
    }

    #[test]
    fn test_no_language_skips_highlighter() {
        let calls = Rc::new(Cell::new(0));
        let mut lines = LineHighlighter::new(Box::new(Counting(calls.clone())), None, 16);
        assert_eq!(lines.highlight("plain"), "plain");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_syntect_keeps_visible_text() {
        let highlighter = SyntectHighlighter::new(Theme::Dark);
        let line = "let answer: u32 = 42; // comment";
        let colored = highlighter.highlight(line, "rs").unwrap();
        assert!(colored.contains("\x1b[38;2;"));
        assert!(colored.ends_with(RESET));
        assert_eq!(strip_escape_sequences(&colored), line);
    }

    #[test]
    fn test_syntect_unknown_language() {
        let highlighter = SyntectHighlighter::new(Theme::Light);
        let err = highlighter.highlight("x", "no-such-language").unwrap_err();
        assert!(matches!(err, HighlightError::UnknownLanguage(_)));
    }
}
