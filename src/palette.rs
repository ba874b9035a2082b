//! Background tints for added and removed lines, blended from theme colors.

use crate::color::{Rgb, mix_rgb, parse_ansi_color, rgb_to_background_sequence};
use crate::theme::{DiffTheme, ThemeBg, ThemeColor};

const ROW_ADD_MIX: f32 = 0.24;
const ROW_REMOVE_MIX: f32 = 0.12;
const EMPHASIS_ADD_MIX: f32 = 0.44;
const EMPHASIS_REMOVE_MIX: f32 = 0.26;

const DEFAULT_BG: (u8, u8, u8) = (32, 35, 42);
const DEFAULT_ADD: (u8, u8, u8) = (88, 173, 88);
const DEFAULT_REMOVE: (u8, u8, u8) = (196, 98, 98);

/// Four background sequences, resolved once per theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPalette {
    pub row_add: String,
    pub row_remove: String,
    pub emphasis_add: String,
    pub emphasis_remove: String,
}

impl DiffPalette {
    /// Blend the theme's base background with its added/removed accents.
    ///
    /// The base is the success background, then the pending background, then
    /// a fixed default. Accents missing from the theme use fixed defaults too,
    /// so resolution never fails.
    pub fn resolve(theme: &dyn DiffTheme) -> Self {
        let base = theme
            .bg_ansi(ThemeBg::Success)
            .and_then(|seq| parse_ansi_color(&seq))
            .or_else(|| {
                theme
                    .bg_ansi(ThemeBg::Pending)
                    .and_then(|seq| parse_ansi_color(&seq))
            })
            .unwrap_or_else(|| rgb(DEFAULT_BG));
        let add = accent(theme, ThemeColor::DiffAdded, DEFAULT_ADD);
        let remove = accent(theme, ThemeColor::DiffRemoved, DEFAULT_REMOVE);

        let tint = |color: Rgb, ratio: f32| rgb_to_background_sequence(mix_rgb(base, color, ratio));
        DiffPalette {
            row_add: tint(add, ROW_ADD_MIX),
            row_remove: tint(remove, ROW_REMOVE_MIX),
            emphasis_add: tint(add, EMPHASIS_ADD_MIX),
            emphasis_remove: tint(remove, EMPHASIS_REMOVE_MIX),
        }
    }
}

fn accent(theme: &dyn DiffTheme, color: ThemeColor, fallback: (u8, u8, u8)) -> Rgb {
    theme
        .fg_ansi(color)
        .and_then(|seq| parse_ansi_color(&seq))
        .unwrap_or_else(|| rgb(fallback))
}

fn rgb((r, g, b): (u8, u8, u8)) -> Rgb {
    Rgb::new(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use pretty_assertions::assert_eq;

    /// Theme that defines nothing.
    struct BareTheme;

    impl DiffTheme for BareTheme {
        fn fg_ansi(&self, _color: ThemeColor) -> Option<String> {
            None
        }

        fn bg_ansi(&self, _bg: ThemeBg) -> Option<String> {
            None
        }
    }

    /// Theme with only a pending background, in 256-color form.
    struct PendingOnly;

    impl DiffTheme for PendingOnly {
        fn fg_ansi(&self, _color: ThemeColor) -> Option<String> {
            Some("\x1b[31m".to_string())
        }

        fn bg_ansi(&self, bg: ThemeBg) -> Option<String> {
            match bg {
                ThemeBg::Success => None,
                ThemeBg::Pending => Some("\x1b[48;5;16m".to_string()),
            }
        }
    }

    #[test]
    fn test_defaults_when_theme_is_empty() {
        let palette = DiffPalette::resolve(&BareTheme);
        assert_eq!(
            palette,
            DiffPalette {
                row_add: "\x1b[48;2;45;68;53m".to_string(),
                row_remove: "\x1b[48;2;52;43;49m".to_string(),
                emphasis_add: "\x1b[48;2;57;96;62m".to_string(),
                emphasis_remove: "\x1b[48;2;75;51;57m".to_string(),
            }
        );
    }

    #[test]
    fn test_pending_background_fallback() {
        // Base is black; named accents cannot be parsed so defaults apply
        let palette = DiffPalette::resolve(&PendingOnly);
        assert_eq!(palette.row_add, "\x1b[48;2;21;42;21m");
        assert_eq!(palette.emphasis_remove, "\x1b[48;2;51;25;25m");
    }

    #[test]
    fn test_emphasis_stronger_than_row_tint() {
        let palette = DiffPalette::resolve(&Theme::Dark);
        let row = parse_ansi_color(&palette.row_add).unwrap();
        let emphasis = parse_ansi_color(&palette.emphasis_add).unwrap();
        assert!(emphasis.g > row.g);

        let row = parse_ansi_color(&palette.row_remove).unwrap();
        let emphasis = parse_ansi_color(&palette.emphasis_remove).unwrap();
        assert!(emphasis.r > row.r);
    }

    #[test]
    fn test_light_and_dark_differ() {
        assert_ne!(DiffPalette::resolve(&Theme::Dark), DiffPalette::resolve(&Theme::Light));
    }
}
