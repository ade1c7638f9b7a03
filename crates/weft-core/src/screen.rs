//! Screen driver — double-buffered diff flush to the terminal.
//!
//! The driver owns a front buffer (what the terminal currently shows)
//! and a back buffer (what the frame painted). `flush` walks the back
//! buffer's dirty rows, emits a cursor move and style delta only where
//! cells actually differ, updates the front buffer, and writes the
//! whole escape stream in a single call. Setting `TUI_DEBUG_FLUSH`
//! routes per-frame statistics to the diagnostic sink.

use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::buffer::CharBuffer;
use crate::error::Result;
use crate::style::{Attributes, Style};
use crate::terminal::Terminal;

/// Double-buffered screen driver.
///
/// The mutex guards the buffer pair during flush and resize, so a frame
/// never overlaps another frame on the same pair.
pub struct ScreenDriver {
    inner: Mutex<DoubleBuffer>,
}

struct DoubleBuffer {
    front: CharBuffer,
    back: CharBuffer,
}

fn debug_flush_enabled() -> bool {
    static FLAG: OnceLock<bool> = OnceLock::new();
    *FLAG.get_or_init(|| {
        std::env::var("TUI_DEBUG_FLUSH").is_ok_and(|v| !v.is_empty())
    })
}

impl ScreenDriver {
    /// Create a driver with front and back buffers of the given size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            inner: Mutex::new(DoubleBuffer {
                front: CharBuffer::new(width, height),
                back: CharBuffer::new(width, height),
            }),
        }
    }

    /// Current buffer dimensions.
    pub fn size(&self) -> (u16, u16) {
        let g = self.lock();
        (g.back.width(), g.back.height())
    }

    /// Run one frame: optionally clear the back buffer's dirty rows,
    /// let `draw` paint into it, then diff-flush against the front
    /// buffer and write the escape stream to the terminal.
    pub fn frame(
        &self,
        term: &mut dyn Terminal,
        clear: bool,
        draw: impl FnOnce(&mut CharBuffer),
    ) -> Result<()> {
        let mut g = self.lock();
        if clear {
            g.back.clear_dirty();
        }
        draw(&mut g.back);
        flush_locked(&mut g, term)
    }

    /// Resize both buffers, clear them, and emit a full-screen clear.
    /// No-op when the size is unchanged.
    pub fn resize(&self, term: &mut dyn Terminal, width: u16, height: u16) -> Result<()> {
        let mut g = self.lock();
        if g.back.width() == width && g.back.height() == height {
            return Ok(());
        }
        g.front.resize(width, height);
        g.front.clear();
        g.back.resize(width, height);
        g.back.clear();
        term.write_raw(b"\x1b[2J\x1b[H")?;
        term.flush()?;
        Ok(())
    }

    /// Read a cell of the front buffer (what the terminal shows).
    /// Intended for tests.
    pub fn front_cell(&self, x: u16, y: u16) -> Option<crate::cell::Cell> {
        self.lock().front.get(x, y).copied()
    }

    fn lock(&self) -> MutexGuard<'_, DoubleBuffer> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn flush_locked(db: &mut DoubleBuffer, term: &mut dyn Terminal) -> Result<()> {
    let width = db.back.width();
    let height = db.back.height();

    let mut out = String::new();
    let mut cursor: Option<(u16, u16)> = None;
    let mut last_style = Style::default();
    let mut style_active = false;
    let mut dirty_rows = 0usize;
    let mut cells_emitted = 0usize;
    let mut cursor_moves = 0usize;
    let mut content_row = 0u16;

    for y in 0..height {
        if !db.back.row_dirty(y) {
            continue;
        }
        dirty_rows += 1;
        for x in 0..width {
            let Some(cell) = db.back.get(x, y).copied() else {
                continue;
            };
            if !cell.is_empty() {
                content_row = y;
            }
            if db.front.get(x, y) == Some(&cell) {
                continue;
            }
            // Placeholder cells (second column of a wide rune) are
            // copied into the front buffer but never emitted.
            if cell.is_placeholder() {
                db.front.set_fast(x, y, cell);
                continue;
            }
            if cursor != Some((x, y)) {
                let _ = write!(out, "\x1b[{};{}H", y + 1, x + 1);
                cursor_moves += 1;
            }
            write_style_delta(&mut out, &last_style, &cell.style, style_active);
            last_style = cell.style;
            style_active = true;
            out.push(cell.ch);
            db.front.set_fast(x, y, cell);
            cells_emitted += 1;
            cursor = Some((x + cell.width(), y));
        }
    }

    if style_active && !last_style.is_plain() {
        out.push_str("\x1b[0m");
    }
    // Lower the watermark to the content extent: everything above it now
    // matches the terminal, so the next clear and flush stop there.
    db.back.set_max_dirty_row(content_row);

    if debug_flush_enabled() {
        tracing::debug!(
            target: "weft::flush",
            dirty_rows,
            cells = cells_emitted,
            cursor_moves,
            bytes = out.len(),
            "frame flushed"
        );
    }

    if !out.is_empty() {
        term.write_raw(out.as_bytes())?;
        term.flush()?;
    }
    Ok(())
}

/// Emit the minimal SGR transition from `prev` to `next`.
fn write_style_delta(out: &mut String, prev: &Style, next: &Style, active: bool) {
    // Turning any attribute off requires a full reset.
    if !active || !prev.attrs.difference(next.attrs).is_empty() {
        if active && !prev.is_plain() {
            out.push_str("\x1b[0m");
        }
        if !next.fg.is_default() {
            next.fg.write_fg(out);
        }
        if !next.bg.is_default() {
            next.bg.write_bg(out);
        }
        write_attrs(out, next.attrs);
        return;
    }
    if prev.fg != next.fg {
        next.fg.write_fg(out);
    }
    if prev.bg != next.bg {
        next.bg.write_bg(out);
    }
    write_attrs(out, next.attrs.difference(prev.attrs));
}

fn write_attrs(out: &mut String, attrs: Attributes) {
    if attrs.contains(Attributes::BOLD) {
        out.push_str("\x1b[1m");
    }
    if attrs.contains(Attributes::DIM) {
        out.push_str("\x1b[2m");
    }
    if attrs.contains(Attributes::ITALIC) {
        out.push_str("\x1b[3m");
    }
    if attrs.contains(Attributes::UNDERLINE) {
        out.push_str("\x1b[4m");
    }
    if attrs.contains(Attributes::BLINK) {
        out.push_str("\x1b[5m");
    }
    if attrs.contains(Attributes::INVERSE) {
        out.push_str("\x1b[7m");
    }
    if attrs.contains(Attributes::STRIKETHROUGH) {
        out.push_str("\x1b[9m");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::color::Color;
    use crate::terminal::TestBackend;

    #[test]
    fn first_frame_emits_content() {
        let driver = ScreenDriver::new(10, 3);
        let mut term = TestBackend::new(10, 3);
        let result = driver.frame(&mut term, true, |back| {
            back.write_string_fast(0, 0, "hi", Style::default(), 10);
        });
        assert!(result.is_ok());
        let out = term.output();
        assert!(out.contains("\x1b[1;1H"));
        assert!(out.contains("hi"));
    }

    #[test]
    fn unchanged_frame_emits_nothing() {
        let driver = ScreenDriver::new(10, 3);
        let mut term = TestBackend::new(10, 3);
        driver
            .frame(&mut term, true, |back| {
                back.write_string_fast(0, 0, "hi", Style::default(), 10);
            })
            .ok();
        term.clear_buffer();
        driver
            .frame(&mut term, true, |back| {
                back.write_string_fast(0, 0, "hi", Style::default(), 10);
            })
            .ok();
        assert!(term.buffer().is_empty());
    }

    #[test]
    fn front_matches_back_after_flush() {
        let driver = ScreenDriver::new(10, 3);
        let mut term = TestBackend::new(10, 3);
        driver
            .frame(&mut term, true, |back| {
                back.write_string_fast(2, 1, "abc", Style::new().fg(Color::RED), 10);
            })
            .ok();
        assert_eq!(driver.front_cell(2, 1).map(|c| c.ch), Some('a'));
        assert_eq!(driver.front_cell(4, 1).map(|c| c.ch), Some('c'));
        assert!(
            driver
                .front_cell(2, 1)
                .is_some_and(|c| c.style.fg == Color::RED)
        );
    }

    #[test]
    fn adjacent_cells_use_one_cursor_move() {
        let driver = ScreenDriver::new(10, 1);
        let mut term = TestBackend::new(10, 1);
        driver
            .frame(&mut term, true, |back| {
                back.write_string_fast(0, 0, "abc", Style::default(), 10);
            })
            .ok();
        let out = term.output();
        assert_eq!(out.matches("\x1b[").count(), 1, "output: {out:?}");
    }

    #[test]
    fn changed_cell_after_gap_moves_cursor() {
        let driver = ScreenDriver::new(10, 1);
        let mut term = TestBackend::new(10, 1);
        driver
            .frame(&mut term, true, |back| {
                back.set_fast(0, 0, Cell::new('a', Style::default()));
                back.set_fast(5, 0, Cell::new('b', Style::default()));
            })
            .ok();
        let out = term.output();
        assert!(out.contains("\x1b[1;1H"));
        assert!(out.contains("\x1b[1;6H"));
    }

    #[test]
    fn style_delta_emitted_once_per_run() {
        let driver = ScreenDriver::new(10, 1);
        let mut term = TestBackend::new(10, 1);
        driver
            .frame(&mut term, true, |back| {
                back.write_string_fast(0, 0, "ab", Style::new().fg(Color::RED), 10);
            })
            .ok();
        let out = term.output();
        assert_eq!(out.matches("\x1b[31m").count(), 1);
        assert!(out.ends_with("\x1b[0m"));
    }

    #[test]
    fn attribute_turn_off_resets() {
        let driver = ScreenDriver::new(10, 1);
        let mut term = TestBackend::new(10, 1);
        driver
            .frame(&mut term, true, |back| {
                back.set_fast(0, 0, Cell::new('a', Style::new().bold()));
                back.set_fast(1, 0, Cell::new('b', Style::default()));
            })
            .ok();
        let out = term.output();
        // bold on for 'a', reset before plain 'b'
        assert!(out.contains("\x1b[1m"));
        assert!(out.contains("\x1b[0m"));
    }

    #[test]
    fn wide_rune_advances_cursor_two_columns() {
        let driver = ScreenDriver::new(10, 1);
        let mut term = TestBackend::new(10, 1);
        driver
            .frame(&mut term, true, |back| {
                back.write_string_fast(0, 0, "\u{4e16}x", Style::default(), 10);
            })
            .ok();
        let out = term.output();
        // One move: the wide rune advances the emitted cursor by 2, so
        // 'x' at column 2 continues the run.
        assert_eq!(out.matches("\x1b[").count(), 1, "output: {out:?}");
        assert!(out.contains('\u{4e16}'));
        assert!(out.contains('x'));
    }

    #[test]
    fn rows_beyond_watermark_are_skipped() {
        let driver = ScreenDriver::new(5, 50);
        let mut term = TestBackend::new(5, 50);
        driver
            .frame(&mut term, true, |back| {
                back.set_fast(0, 0, Cell::new('a', Style::default()));
            })
            .ok();
        term.clear_buffer();
        // Second frame: stale front rows below the watermark must not
        // be re-examined; nothing changed, nothing emitted.
        driver
            .frame(&mut term, true, |back| {
                back.set_fast(0, 0, Cell::new('a', Style::default()));
            })
            .ok();
        assert!(term.buffer().is_empty());
    }

    #[test]
    fn shrinking_content_blanks_abandoned_rows() {
        let driver = ScreenDriver::new(10, 6);
        let mut term = TestBackend::new(10, 6);
        driver
            .frame(&mut term, true, |back| {
                for y in 0..4 {
                    back.write_string_fast(0, y, "xxxx", Style::default(), 10);
                }
            })
            .ok();
        // Second frame paints only the top row; rows 1..4 must be
        // blanked on the terminal, not left stale.
        driver
            .frame(&mut term, true, |back| {
                back.write_string_fast(0, 0, "xxxx", Style::default(), 10);
            })
            .ok();
        assert!(driver.front_cell(0, 1).is_some_and(|c| c.is_empty()));
        assert!(driver.front_cell(3, 3).is_some_and(|c| c.is_empty()));
        assert_eq!(driver.front_cell(0, 0).map(|c| c.ch), Some('x'));
    }

    #[test]
    fn resize_clears_and_emits_full_clear() {
        let driver = ScreenDriver::new(5, 5);
        let mut term = TestBackend::new(5, 5);
        driver
            .frame(&mut term, true, |back| {
                back.set_fast(0, 0, Cell::new('a', Style::default()));
            })
            .ok();
        term.clear_buffer();
        driver.resize(&mut term, 8, 8).ok();
        assert_eq!(driver.size(), (8, 8));
        assert!(term.output().contains("\x1b[2J"));
        assert!(driver.front_cell(0, 0).is_some_and(|c| c.is_empty()));
    }

    #[test]
    fn resize_same_size_is_noop() {
        let driver = ScreenDriver::new(5, 5);
        let mut term = TestBackend::new(5, 5);
        driver.resize(&mut term, 5, 5).ok();
        assert!(term.buffer().is_empty());
    }

    #[test]
    fn cleared_cell_is_repainted_as_blank() {
        let driver = ScreenDriver::new(10, 1);
        let mut term = TestBackend::new(10, 1);
        driver
            .frame(&mut term, true, |back| {
                back.write_string_fast(0, 0, "abc", Style::default(), 10);
            })
            .ok();
        term.clear_buffer();
        driver
            .frame(&mut term, true, |back| {
                back.write_string_fast(0, 0, "ab", Style::default(), 10);
            })
            .ok();
        // 'c' became blank: exactly one cell re-emitted.
        let out = term.output();
        assert!(out.contains("\x1b[1;3H"));
        assert_eq!(driver.front_cell(2, 0).map(|c| c.ch), Some(' '));
    }
}
