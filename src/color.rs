//! RGB colors parsed out of (and turned back into) SGR escape sequences.

use crossterm::Command;
use crossterm::style::{Color, SetBackgroundColor};

/// Color with channels in `0..=255`. Channels may hold fractional values
/// while blending; they are rounded and clamped when turned into a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb {
            r: r as f32,
            g: g as f32,
            b: b as f32,
        }
    }

    /// Rounded, clamped channels.
    pub fn to_u8(self) -> (u8, u8, u8) {
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

fn channel(value: f32) -> u8 {
    // NaN casts to 0
    value.round().clamp(0.0, 255.0) as u8
}

/// The 16 system colors, xterm defaults.
const SYSTEM_COLORS: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (128, 0, 0),
    (0, 128, 0),
    (128, 128, 0),
    (0, 0, 128),
    (128, 0, 128),
    (0, 128, 128),
    (192, 192, 192),
    (128, 128, 128),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (0, 0, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Map a 256-color palette index to RGB.
pub fn ansi256_to_rgb(index: u8) -> Rgb {
    match index {
        0..=15 => {
            let (r, g, b) = SYSTEM_COLORS[usize::from(index)];
            Rgb::new(r, g, b)
        }
        16..=231 => {
            let cube = index - 16;
            Rgb::new(
                CUBE_LEVELS[usize::from(cube / 36)],
                CUBE_LEVELS[usize::from((cube % 36) / 6)],
                CUBE_LEVELS[usize::from(cube % 6)],
            )
        }
        // The ramp tops out at 238; the last step is pinned to white.
        255 => Rgb::new(255, 255, 255),
        _ => {
            let level = (8 + (u16::from(index) - 232) * 10).min(255) as u8;
            Rgb::new(level, level, level)
        }
    }
}

/// Parse the first extended foreground or background color out of an SGR
/// sequence: `38;2;r;g;b`, `48;2;r;g;b`, `38;5;n` or `48;5;n`.
///
/// Anything else (named colors, malformed input, out-of-range values) yields
/// `None`.
pub fn parse_ansi_color(seq: &str) -> Option<Rgb> {
    let params = seq.strip_prefix("\x1b[")?.strip_suffix('m')?;
    let codes: Vec<&str> = params.split(';').collect();

    let mut i = 0;
    while i < codes.len() {
        if matches!(codes[i], "38" | "48") {
            match codes.get(i + 1).copied() {
                Some("2") => {
                    let r = codes.get(i + 2)?.parse::<u8>().ok()?;
                    let g = codes.get(i + 3)?.parse::<u8>().ok()?;
                    let b = codes.get(i + 4)?.parse::<u8>().ok()?;
                    return Some(Rgb::new(r, g, b));
                }
                Some("5") => {
                    let index = codes.get(i + 2)?.parse::<u8>().ok()?;
                    return Some(ansi256_to_rgb(index));
                }
                _ => return None,
            }
        }
        i += 1;
    }
    None
}

/// Linear blend from `base` toward `tint`; `ratio` is clamped to `[0, 1]`.
pub fn mix_rgb(base: Rgb, tint: Rgb, ratio: f32) -> Rgb {
    let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
    let mix = |a: f32, b: f32| a + (b - a) * ratio;
    Rgb {
        r: mix(base.r, tint.r),
        g: mix(base.g, tint.g),
        b: mix(base.b, tint.b),
    }
}

/// 24-bit background sequence for `rgb`.
pub fn rgb_to_background_sequence(rgb: Rgb) -> String {
    let (r, g, b) = rgb.to_u8();
    ansi_string(SetBackgroundColor(Color::Rgb { r, g, b }))
}

/// Render a crossterm command to its escape sequence.
pub(crate) fn ansi_string(command: impl Command) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = command.write_ansi(&mut out);
    out
}
