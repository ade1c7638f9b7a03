//! Character buffer — the paint target.
//!
//! A rectangular grid of cells with border-rune merging on write and a
//! dirty-row watermark so frame clears and flushes only touch the rows
//! that actually held content.

use crate::border::{Border, merge_runes};
use crate::cell::Cell;
use crate::style::Style;
use unicode_width::UnicodeWidthChar;

/// A rectangular grid of `(rune, style)` cells.
#[derive(Clone, Debug)]
pub struct CharBuffer {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
    max_dirty_row: u16,
}

impl CharBuffer {
    /// Create a new buffer filled with empty cells.
    pub fn new(width: u16, height: u16) -> Self {
        let len = usize::from(width) * usize::from(height);
        Self {
            cells: vec![Cell::EMPTY; len],
            width,
            height,
            max_dirty_row: 0,
        }
    }

    /// Buffer width in columns.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in rows.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Highest row written since the last clear.
    pub fn max_dirty_row(&self) -> u16 {
        self.max_dirty_row
    }

    /// Returns true if the row may contain content written since the
    /// last clear. Rows above the watermark are known-clean.
    pub fn row_dirty(&self, y: u16) -> bool {
        y <= self.max_dirty_row
    }

    /// Lower the dirty watermark to the given row. Used by the screen
    /// driver after a flush, once rows above the content extent are
    /// known to match the terminal.
    pub(crate) fn set_max_dirty_row(&mut self, row: u16) {
        self.max_dirty_row = row.min(self.height.saturating_sub(1));
    }

    /// Get the cell at (x, y), or `None` if out of bounds.
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(self.index(x, y))
        } else {
            None
        }
    }

    /// Set a cell, merging box-drawing runes with the existing cell.
    ///
    /// Out-of-bounds writes are silently dropped. The dirty watermark is
    /// raised to cover the row.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        let merged = match self.cells.get(idx) {
            Some(existing) => merge_runes(existing.ch, cell.ch),
            None => cell.ch,
        };
        if let Some(c) = self.cells.get_mut(idx) {
            *c = Cell::new(merged, cell.style);
        }
        self.mark_dirty(y);
    }

    /// Set a cell without border merging. Out-of-bounds writes are dropped.
    pub fn set_fast(&mut self, x: u16, y: u16, cell: Cell) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        if let Some(c) = self.cells.get_mut(idx) {
            *c = cell;
        }
        self.mark_dirty(y);
    }

    /// Write a string starting at (x, y), one cell per rune, stopping at
    /// `max_width` columns or the buffer edge. Wide runes occupy two
    /// columns with a placeholder in the second; a wide rune that does
    /// not fit is dropped.
    pub fn write_string_fast(&mut self, x: u16, y: u16, text: &str, style: Style, max_width: u16) {
        if y >= self.height {
            return;
        }
        let mut col = x;
        let limit = x.saturating_add(max_width).min(self.width);
        for ch in text.chars() {
            if col >= limit {
                break;
            }
            let cw = UnicodeWidthChar::width(ch).unwrap_or(1) as u16;
            if cw == 2 {
                if col + 1 >= limit {
                    break;
                }
                self.set_fast(col, y, Cell::new(ch, style));
                self.set_fast(col + 1, y, Cell::PLACEHOLDER);
                col += 2;
            } else {
                self.set_fast(col, y, Cell::new(ch, style));
                col += 1;
            }
        }
    }

    /// Write a progress bar of `width` cells, filled up to
    /// `floor(width * ratio)`.
    pub fn write_progress_bar(&mut self, x: u16, y: u16, width: u16, ratio: f32, style: Style) {
        let ratio = ratio.clamp(0.0, 1.0);
        let filled = (f32::from(width) * ratio).floor() as u16;
        for i in 0..width {
            let ch = if i < filled { '\u{2588}' } else { '\u{2591}' };
            self.set_fast(x + i, y, Cell::new(ch, style));
        }
    }

    /// Draw a rectangular border through the merging `set`, so touching
    /// borders form junctions. Cells outside the buffer are clipped.
    pub fn draw_border(&mut self, x: u16, y: u16, w: u16, h: u16, border: Border, style: Style) {
        if w == 0 || h == 0 {
            return;
        }
        let x2 = x.saturating_add(w - 1);
        let y2 = y.saturating_add(h - 1);

        self.set(x, y, Cell::new(border.top_left, style));
        self.set(x2, y, Cell::new(border.top_right, style));
        self.set(x, y2, Cell::new(border.bottom_left, style));
        self.set(x2, y2, Cell::new(border.bottom_right, style));

        for cx in (x + 1)..x2 {
            self.set(cx, y, Cell::new(border.horizontal, style));
            self.set(cx, y2, Cell::new(border.horizontal, style));
        }
        for cy in (y + 1)..y2 {
            self.set(x, cy, Cell::new(border.vertical, style));
            self.set(x2, cy, Cell::new(border.vertical, style));
        }
    }

    /// Fill a rectangle with space cells in the given style.
    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, style: Style) {
        for cy in y..y.saturating_add(h) {
            for cx in x..x.saturating_add(w) {
                self.set_fast(cx, cy, Cell::new(' ', style));
            }
        }
    }

    /// Clear rows 0..=`max_dirty_row`. When content occupies only the
    /// top of a tall buffer this is far cheaper than a full clear.
    ///
    /// The watermark is kept: the blanked rows still differ from what
    /// the terminal shows until the next flush reconciles them.
    pub fn clear_dirty(&mut self) {
        let last = self.max_dirty_row.min(self.height.saturating_sub(1));
        let end = (usize::from(last) + 1) * usize::from(self.width);
        let end = end.min(self.cells.len());
        for cell in &mut self.cells[..end] {
            *cell = Cell::EMPTY;
        }
    }

    /// Clear every cell and reset the watermark.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::EMPTY;
        }
        self.max_dirty_row = 0;
    }

    /// Resize the buffer, preserving the top-left overlap.
    pub fn resize(&mut self, width: u16, height: u16) {
        let len = usize::from(width) * usize::from(height);
        let mut cells = vec![Cell::EMPTY; len];
        let copy_w = usize::from(self.width.min(width));
        for y in 0..usize::from(self.height.min(height)) {
            let src = y * usize::from(self.width);
            let dst = y * usize::from(width);
            cells[dst..dst + copy_w].copy_from_slice(&self.cells[src..src + copy_w]);
        }
        self.cells = cells;
        self.width = width;
        self.height = height;
        self.max_dirty_row = self.max_dirty_row.min(height.saturating_sub(1));
    }

    /// The cells of one row, or `None` if out of bounds.
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// The text of one row with trailing whitespace trimmed.
    /// Placeholder cells are skipped. Intended for tests.
    pub fn line_text(&self, y: u16) -> String {
        let Some(row) = self.row(y) else {
            return String::new();
        };
        let mut out = String::with_capacity(row.len());
        for cell in row {
            if !cell.is_placeholder() {
                out.push(cell.ch);
            }
        }
        out.truncate(out.trim_end().len());
        out
    }

    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }

    fn mark_dirty(&mut self, y: u16) {
        if y > self.max_dirty_row {
            self.max_dirty_row = y;
        }
    }
}
