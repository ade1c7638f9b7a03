//! Terminal color type and SGR code emission.

use std::fmt::Write;

/// A terminal color.
///
/// `Default` defers to the terminal's configured colors; the palette
/// variants index the standard 16- and 256-color tables; `Rgb` is 24-bit
/// true color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    /// The terminal's default color.
    #[default]
    Default,
    /// One of the 16 ANSI palette colors (0-7 normal, 8-15 bright).
    Palette16(u8),
    /// One of the 256 extended palette colors.
    Palette256(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// ANSI black.
    pub const BLACK: Color = Color::Palette16(0);
    /// ANSI red.
    pub const RED: Color = Color::Palette16(1);
    /// ANSI green.
    pub const GREEN: Color = Color::Palette16(2);
    /// ANSI yellow.
    pub const YELLOW: Color = Color::Palette16(3);
    /// ANSI blue.
    pub const BLUE: Color = Color::Palette16(4);
    /// ANSI magenta.
    pub const MAGENTA: Color = Color::Palette16(5);
    /// ANSI cyan.
    pub const CYAN: Color = Color::Palette16(6);
    /// ANSI white.
    pub const WHITE: Color = Color::Palette16(7);
    /// ANSI bright black (gray).
    pub const BRIGHT_BLACK: Color = Color::Palette16(8);
    /// ANSI bright red.
    pub const BRIGHT_RED: Color = Color::Palette16(9);
    /// ANSI bright green.
    pub const BRIGHT_GREEN: Color = Color::Palette16(10);
    /// ANSI bright yellow.
    pub const BRIGHT_YELLOW: Color = Color::Palette16(11);
    /// ANSI bright blue.
    pub const BRIGHT_BLUE: Color = Color::Palette16(12);
    /// ANSI bright magenta.
    pub const BRIGHT_MAGENTA: Color = Color::Palette16(13);
    /// ANSI bright cyan.
    pub const BRIGHT_CYAN: Color = Color::Palette16(14);
    /// ANSI bright white.
    pub const BRIGHT_WHITE: Color = Color::Palette16(15);

    /// Append the SGR foreground sequence for this color to `out`.
    pub fn write_fg(&self, out: &mut String) {
        match self {
            Color::Default => out.push_str("\x1b[39m"),
            Color::Palette16(n) => {
                let code = if *n < 8 { 30 + n } else { 90 + (n - 8) };
                let _ = write!(out, "\x1b[{code}m");
            }
            Color::Palette256(n) => {
                let _ = write!(out, "\x1b[38;5;{n}m");
            }
            Color::Rgb(r, g, b) => {
                let _ = write!(out, "\x1b[38;2;{r};{g};{b}m");
            }
        }
    }

    /// Append the SGR background sequence for this color to `out`.
    pub fn write_bg(&self, out: &mut String) {
        match self {
            Color::Default => out.push_str("\x1b[49m"),
            Color::Palette16(n) => {
                let code = if *n < 8 { 40 + n } else { 100 + (n - 8) };
                let _ = write!(out, "\x1b[{code}m");
            }
            Color::Palette256(n) => {
                let _ = write!(out, "\x1b[48;5;{n}m");
            }
            Color::Rgb(r, g, b) => {
                let _ = write!(out, "\x1b[48;2;{r};{g};{b}m");
            }
        }
    }

    /// Returns true if this is the terminal default color.
    pub fn is_default(&self) -> bool {
        matches!(self, Color::Default)
    }
}
