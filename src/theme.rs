//! Theme lookups used by the split-diff renderer.
//!
//! Renderers only talk to [`DiffTheme`], which hands out escape sequences for
//! named colors. [`Theme`] is the built-in implementation.

use crossterm::style::{Attribute, Color, SetAttribute, SetBackgroundColor, SetForegroundColor};
use serde::{Deserialize, Serialize};

use crate::color::ansi_string;

/// Named foreground colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeColor {
    DiffAdded,
    DiffRemoved,
    DiffContext,
    Border,
    LineNumber,
    Muted,
    Warning,
}

/// Named background colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeBg {
    Success,
    Pending,
}

/// Color and text-style lookups.
///
/// `None` from a lookup means the theme does not define that color; callers
/// fall back to their own defaults.
pub trait DiffTheme {
    fn fg_ansi(&self, color: ThemeColor) -> Option<String>;

    fn bg_ansi(&self, bg: ThemeBg) -> Option<String>;

    /// Color `text` with a named foreground, resetting only the foreground.
    fn fg(&self, color: ThemeColor, text: &str) -> String {
        match self.fg_ansi(color) {
            Some(seq) => format!("{seq}{text}{}", ansi_string(SetForegroundColor(Color::Reset))),
            None => text.to_string(),
        }
    }

    fn bold(&self, text: &str) -> String {
        wrap_attribute(text, Attribute::Bold, Attribute::NormalIntensity)
    }

    fn dim(&self, text: &str) -> String {
        wrap_attribute(text, Attribute::Dim, Attribute::NormalIntensity)
    }

    fn strikethrough(&self, text: &str) -> String {
        wrap_attribute(text, Attribute::CrossedOut, Attribute::NotCrossedOut)
    }
}

fn wrap_attribute(text: &str, on: Attribute, off: Attribute) -> String {
    format!(
        "{}{text}{}",
        ansi_string(SetAttribute(on)),
        ansi_string(SetAttribute(off))
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Clone, Copy)]
pub struct ColorScheme {
    pub success_bg: Color,
    pub pending_bg: Color,
    pub diff_added: Color,
    pub diff_removed: Color,
    pub diff_context: Color,
    pub border: Color,
    pub line_number_fg: Color,
    pub muted: Color,
    pub warning: Color,
}

impl Theme {
    pub fn colors(&self) -> ColorScheme {
        match self {
            Theme::Dark => ColorScheme {
                success_bg: Color::Rgb {
                    r: 32,
                    g: 35,
                    b: 42,
                },
                pending_bg: Color::Rgb {
                    r: 40,
                    g: 40,
                    b: 50,
                },
                // Accents also drive the blended row backgrounds
                diff_added: Color::Rgb {
                    r: 100,
                    g: 200,
                    b: 100,
                },
                diff_removed: Color::Rgb {
                    r: 200,
                    g: 100,
                    b: 100,
                },
                diff_context: Color::Rgb {
                    r: 200,
                    g: 200,
                    b: 200,
                },
                border: Color::Rgb {
                    r: 80,
                    g: 80,
                    b: 80,
                },
                line_number_fg: Color::Rgb {
                    r: 120,
                    g: 120,
                    b: 120,
                },
                muted: Color::DarkGrey,
                warning: Color::Rgb {
                    r: 200,
                    g: 120,
                    b: 50,
                },
            },
            Theme::Light => ColorScheme {
                success_bg: Color::Rgb {
                    r: 247,
                    g: 247,
                    b: 247,
                },
                pending_bg: Color::Rgb {
                    r: 235,
                    g: 235,
                    b: 245,
                },
                diff_added: Color::Rgb {
                    r: 50,
                    g: 150,
                    b: 50,
                },
                diff_removed: Color::Rgb {
                    r: 180,
                    g: 50,
                    b: 50,
                },
                diff_context: Color::Rgb {
                    r: 40,
                    g: 40,
                    b: 40,
                },
                border: Color::Rgb {
                    r: 180,
                    g: 180,
                    b: 180,
                },
                line_number_fg: Color::Rgb {
                    r: 100,
                    g: 100,
                    b: 100,
                },
                muted: Color::Grey,
                warning: Color::Rgb {
                    r: 230,
                    g: 140,
                    b: 60,
                },
            },
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme `{other}` (expected `dark` or `light`)")),
        }
    }
}

impl DiffTheme for Theme {
    fn fg_ansi(&self, color: ThemeColor) -> Option<String> {
        let colors = self.colors();
        let fg = match color {
            ThemeColor::DiffAdded => colors.diff_added,
            ThemeColor::DiffRemoved => colors.diff_removed,
            ThemeColor::DiffContext => colors.diff_context,
            ThemeColor::Border => colors.border,
            ThemeColor::LineNumber => colors.line_number_fg,
            ThemeColor::Muted => colors.muted,
            ThemeColor::Warning => colors.warning,
        };
        Some(ansi_string(SetForegroundColor(fg)))
    }

    fn bg_ansi(&self, bg: ThemeBg) -> Option<String> {
        let colors = self.colors();
        let bg = match bg {
            ThemeBg::Success => colors.success_bg,
            ThemeBg::Pending => colors.pending_bg,
        };
        Some(ansi_string(SetBackgroundColor(bg)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgb, parse_ansi_color};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dark_theme_sequences_parse() {
        let theme = Theme::Dark;
        assert_eq!(
            parse_ansi_color(&theme.bg_ansi(ThemeBg::Success).unwrap()),
            Some(Rgb::new(32, 35, 42))
        );
        assert_eq!(
            parse_ansi_color(&theme.fg_ansi(ThemeColor::DiffAdded).unwrap()),
            Some(Rgb::new(100, 200, 100))
        );
    }

    #[test]
    fn test_named_color_uses_256_palette_form() {
        // crossterm writes named colors as palette indices
        let seq = Theme::Dark.fg_ansi(ThemeColor::Muted).unwrap();
        assert_eq!(seq, "\x1b[38;5;8m");
        assert_eq!(parse_ansi_color(&seq), Some(Rgb::new(128, 128, 128)));
    }

    #[test]
    fn test_diff_accents_distinct() {
        for theme in [Theme::Dark, Theme::Light] {
            let colors = theme.colors();
            assert_ne!(colors.diff_added, colors.diff_removed);
            assert_ne!(colors.success_bg, colors.pending_bg);
        }
    }

    #[test]
    fn test_style_helpers() {
        let theme = Theme::Light;
        assert_eq!(theme.bold("x"), "\x1b[1mx\x1b[22m");
        assert_eq!(theme.dim("x"), "\x1b[2mx\x1b[22m");
        assert_eq!(theme.strikethrough("x"), "\x1b[9mx\x1b[29m");
    }

    #[test]
    fn test_fg_resets_only_foreground() {
        let out = Theme::Dark.fg(ThemeColor::Border, "│");
        assert_eq!(out, "\x1b[38;2;80;80;80m│\x1b[39m");
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert!("solarized".parse::<Theme>().is_err());
    }
}
