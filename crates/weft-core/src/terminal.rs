//! Terminal abstraction for backend-agnostic output.

mod crossterm_backend;
mod test_backend;
mod traits;

pub use crossterm_backend::CrosstermBackend;
pub use test_backend::TestBackend;
pub use traits::Terminal;

use crate::color::Color;

/// Escape sequence emitted on raw-mode entry: enter the alt screen,
/// clear, home, hide the cursor, enable bracketed paste.
pub const ENTER_SEQUENCE: &str = "\x1b[?1049h\x1b[2J\x1b[H\x1b[?25l\x1b[?2004h";

/// Escape sequence emitted on raw-mode exit: disable bracketed paste,
/// show the cursor, leave the alt screen.
pub const EXIT_SEQUENCE: &str = "\x1b[?2004l\x1b[?25h\x1b[?1049l";

/// Cursor shapes selectable via `CSI n SP q`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorShape {
    /// The terminal's configured default.
    Default,
    /// Steady block.
    Block,
    /// Steady underline.
    Underline,
    /// Steady bar.
    Bar,
}

/// The escape sequence selecting a cursor shape.
pub fn cursor_shape_seq(shape: CursorShape) -> String {
    let n = match shape {
        CursorShape::Default => 0,
        CursorShape::Block => 2,
        CursorShape::Underline => 4,
        CursorShape::Bar => 6,
    };
    format!("\x1b[{n} q")
}

/// The OSC 12 sequence setting the cursor color. Only RGB colors can be
/// expressed; other variants return `None`.
pub fn cursor_color_seq(color: Color) -> Option<String> {
    match color {
        Color::Rgb(r, g, b) => Some(format!("\x1b]12;#{r:02x}{g:02x}{b:02x}\x07")),
        _ => None,
    }
}
