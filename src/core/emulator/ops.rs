// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Buffer-mutating operations shared by the VT parser's dispatch methods.
//!
//! Keeping these as inherent [`Screen`] methods (rather than inlining them into
//! [`super::performer::Performer`]) mirrors the teacher's split between a thin
//! parser shim and the buffer doing the actual work.

use super::{glyph::Glyph,
            scrollback::Scrollback,
            screen::Screen};

impl Screen {
    /// Writes `glyph` at the cursor, advancing it and handling autowrap/scroll.
    /// `scrollback` receives rows evicted off the top of the primary buffer.
    pub fn put_glyph(&mut self, glyph: Glyph, wide: bool, scrollback: &mut Scrollback, dirty: &mut super::dirty::DirtyTracker) {
        if self.modes.wrap_pending {
            self.newline_with_scroll(scrollback, dirty);
            self.cursor.col = 0;
            self.modes.wrap_pending = false;
            self.grid_mut()[self.cursor.row][0].attrs.wrap = true;
        }
        if wide && self.cursor.col + 1 >= self.cols {
            // Not enough room for a wide glyph on this row: pad and wrap first.
            self.newline_with_scroll(scrollback, dirty);
            self.cursor.col = 0;
        }
        let row = self.cursor.row;
        let col = self.cursor.col;
        self.grid_mut()[row][col] = glyph;
        dirty.mark_row(row);
        if wide {
            let trailer = Glyph::continuation_of(&self.grid()[row][col]);
            self.grid_mut()[row][col + 1] = trailer;
        }
        let advance = if wide { 2 } else { 1 };
        if self.cursor.col + advance >= self.cols {
            self.cursor.col = self.cols - 1;
            if self.modes.autowrap {
                self.modes.wrap_pending = true;
            }
        } else {
            self.cursor.col += advance;
        }
    }

    /// Line feed: moves the cursor down one row, scrolling within the scroll
    /// region (and into scrollback, if at the bottom of the primary buffer's full
    /// extent) when needed.
    pub fn newline_with_scroll(&mut self, scrollback: &mut Scrollback, dirty: &mut super::dirty::DirtyTracker) {
        if self.cursor.row == self.scroll_region.bottom {
            self.scroll_up(1, scrollback, dirty);
        } else if self.cursor.row + 1 < self.rows {
            self.cursor.row += 1;
        }
    }

    /// SU: scrolls the region up by `n` rows; rows scrolled off the top of a
    /// full-screen primary region are pushed into `scrollback`.
    pub fn scroll_up(&mut self, n: usize, scrollback: &mut Scrollback, dirty: &mut super::dirty::DirtyTracker) {
        let top = self.scroll_region.top;
        let bottom = self.scroll_region.bottom;
        let into_history = !self.alt_active && top == 0;
        for _ in 0..n.min(bottom - top + 1) {
            let grid = self.grid_mut();
            let evicted = grid.remove(top);
            if into_history {
                scrollback.push(evicted);
            }
            grid.insert(bottom, vec![Glyph::default(); self.cols]);
        }
        for row in top..=bottom {
            dirty.mark_row(row);
        }
    }

    /// SD: scrolls the region down by `n` rows (history is not consulted; rows
    /// scrolled off the bottom are simply dropped).
    pub fn scroll_down(&mut self, n: usize, dirty: &mut super::dirty::DirtyTracker) {
        let top = self.scroll_region.top;
        let bottom = self.scroll_region.bottom;
        for _ in 0..n.min(bottom - top + 1) {
            let grid = self.grid_mut();
            grid.remove(bottom);
            grid.insert(top, vec![Glyph::default(); self.cols]);
        }
        for row in top..=bottom {
            dirty.mark_row(row);
        }
    }

    fn clamp_row(&self, row: i64) -> usize { row.clamp(0, self.rows as i64 - 1) as usize }

    fn clamp_col(&self, col: i64) -> usize { col.clamp(0, self.cols as i64 - 1) as usize }

    /// Top of the addressing region the cursor is confined to: the scroll region
    /// when DECOM (origin mode) is set, the whole screen otherwise.
    #[must_use]
    pub fn origin_top(&self) -> usize { if self.modes.origin { self.scroll_region.top } else { 0 } }

    pub fn cursor_up(&mut self, n: usize) {
        self.modes.wrap_pending = false;
        let floor = self.origin_top();
        self.cursor.row = self.cursor.row.saturating_sub(n).max(floor);
    }

    pub fn cursor_down(&mut self, n: usize) {
        self.modes.wrap_pending = false;
        let ceil = if self.modes.origin { self.scroll_region.bottom } else { self.rows - 1 };
        self.cursor.row = (self.cursor.row + n).min(ceil);
    }

    pub fn cursor_forward(&mut self, n: usize) {
        self.modes.wrap_pending = false;
        self.cursor.col = (self.cursor.col + n).min(self.cols - 1);
    }

    pub fn cursor_back(&mut self, n: usize) {
        self.modes.wrap_pending = false;
        self.cursor.col = self.cursor.col.saturating_sub(n);
    }

    /// CUP/HVP: absolute positioning, 1-indexed on the wire, relative to the
    /// origin-mode floor.
    pub fn cursor_to(&mut self, row_1based: i64, col_1based: i64) {
        self.modes.wrap_pending = false;
        let floor = self.origin_top() as i64;
        self.cursor.row = self.clamp_row(floor + (row_1based - 1).max(0));
        self.cursor.col = self.clamp_col((col_1based - 1).max(0));
    }

    pub fn cursor_to_col(&mut self, col_1based: i64) {
        self.modes.wrap_pending = false;
        self.cursor.col = self.clamp_col((col_1based - 1).max(0));
    }

    pub fn cursor_to_row(&mut self, row_1based: i64) {
        self.modes.wrap_pending = false;
        let floor = self.origin_top() as i64;
        self.cursor.row = self.clamp_row(floor + (row_1based - 1).max(0));
    }

    pub fn cursor_next_line(&mut self, n: usize) {
        self.cursor_down(n);
        self.cursor.col = 0;
        self.modes.wrap_pending = false;
    }

    pub fn cursor_prev_line(&mut self, n: usize) {
        self.cursor_up(n);
        self.cursor.col = 0;
        self.modes.wrap_pending = false;
    }

    /// ED: erase-in-display, modes 0 (cursor..end), 1 (start..=cursor), 2 (all), 3
    /// (all, plus this implementation also clears scrollback — xterm's "erase
    /// saved lines").
    pub fn erase_display(&mut self, mode: u16, scrollback: &mut Scrollback, dirty: &mut super::dirty::DirtyTracker) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        match mode {
            0 => {
                self.erase_line_range(row, col, self.cols);
                for r in (row + 1)..self.rows {
                    self.erase_line_range(r, 0, self.cols);
                }
            }
            1 => {
                self.erase_line_range(row, 0, col + 1);
                for r in 0..row {
                    self.erase_line_range(r, 0, self.cols);
                }
            }
            2 => {
                for r in 0..self.rows {
                    self.erase_line_range(r, 0, self.cols);
                }
            }
            3 => {
                for r in 0..self.rows {
                    self.erase_line_range(r, 0, self.cols);
                }
                scrollback.clear();
            }
            _ => {}
        }
        for r in 0..self.rows {
            dirty.mark_row(r);
        }
    }

    /// EL: erase-in-line, modes 0 (cursor..end), 1 (start..=cursor), 2 (whole line).
    pub fn erase_line(&mut self, mode: u16, dirty: &mut super::dirty::DirtyTracker) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        match mode {
            0 => self.erase_line_range(row, col, self.cols),
            1 => self.erase_line_range(row, 0, col + 1),
            2 => self.erase_line_range(row, 0, self.cols),
            _ => {}
        }
        dirty.mark_row(row);
    }

    fn erase_line_range(&mut self, row: usize, from: usize, to: usize) {
        let to = to.min(self.cols);
        if let Some(line) = self.grid_mut().get_mut(row) {
            for cell in &mut line[from.min(to)..to] {
                *cell = Glyph::default();
            }
        }
    }

    /// ECH: erases `n` characters starting at the cursor, without moving it.
    pub fn erase_chars(&mut self, n: usize, dirty: &mut super::dirty::DirtyTracker) {
        let row = self.cursor.row;
        let col = self.cursor.col;
        self.erase_line_range(row, col, col + n);
        dirty.mark_row(row);
    }

    /// ICH: inserts `n` blank cells at the cursor, shifting the remainder right
    /// (cells pushed off the right edge are discarded).
    pub fn insert_chars(&mut self, n: usize, dirty: &mut super::dirty::DirtyTracker) {
        let row = self.cursor.row;
        let col = self.cursor.col;
        let cols = self.cols;
        let line = &mut self.grid_mut()[row];
        for _ in 0..n.min(cols - col) {
            line.insert(col, Glyph::default());
            line.truncate(cols);
        }
        dirty.mark_row(row);
    }

    /// DCH: deletes `n` cells at the cursor, shifting the remainder left and
    /// filling the vacated tail with blanks.
    pub fn delete_chars(&mut self, n: usize, dirty: &mut super::dirty::DirtyTracker) {
        let row = self.cursor.row;
        let col = self.cursor.col;
        let cols = self.cols;
        let line = &mut self.grid_mut()[row];
        for _ in 0..n.min(cols - col) {
            line.remove(col);
            line.push(Glyph::default());
        }
        dirty.mark_row(row);
    }

    /// IL: inserts `n` blank lines at the cursor row, within the scroll region.
    pub fn insert_lines(&mut self, n: usize, dirty: &mut super::dirty::DirtyTracker) {
        let row = self.cursor.row;
        let bottom = self.scroll_region.bottom;
        if row < self.scroll_region.top || row > bottom {
            return;
        }
        let cols = self.cols;
        let grid = self.grid_mut();
        for _ in 0..n.min(bottom - row + 1) {
            grid.remove(bottom);
            grid.insert(row, vec![Glyph::default(); cols]);
        }
        for r in row..=bottom {
            dirty.mark_row(r);
        }
    }

    /// DL: deletes `n` lines at the cursor row, within the scroll region.
    pub fn delete_lines(&mut self, n: usize, dirty: &mut super::dirty::DirtyTracker) {
        let row = self.cursor.row;
        let bottom = self.scroll_region.bottom;
        if row < self.scroll_region.top || row > bottom {
            return;
        }
        let cols = self.cols;
        let grid = self.grid_mut();
        for _ in 0..n.min(bottom - row + 1) {
            grid.remove(row);
            grid.insert(bottom, vec![Glyph::default(); cols]);
        }
        for r in row..=bottom {
            dirty.mark_row(r);
        }
    }

    /// DECSTBM: sets the scroll region (1-indexed on the wire, clamped to the
    /// screen). An empty/default pair means "whole screen".
    pub fn set_scroll_region(&mut self, top_1based: Option<u16>, bottom_1based: Option<u16>) {
        let top = top_1based.map_or(0, |t| (t as usize).saturating_sub(1));
        let bottom = bottom_1based.map_or(self.rows - 1, |b| (b as usize).saturating_sub(1));
        if top < bottom && bottom < self.rows {
            self.scroll_region = super::screen::ScrollRegion { top, bottom };
        } else {
            self.scroll_region = super::screen::ScrollRegion { top: 0, bottom: self.rows - 1 };
        }
        self.cursor.row = self.origin_top();
        self.cursor.col = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::emulator::dirty::DirtyTracker;

    fn fixture() -> (Screen, Scrollback, DirtyTracker) {
        (Screen::new(10, 5), Scrollback::new(100), DirtyTracker::new())
    }

    #[test]
    fn scroll_up_evicts_into_scrollback() {
        let (mut screen, mut scrollback, mut dirty) = fixture();
        screen.grid_mut()[0][0].ch = 'a';
        screen.scroll_up(1, &mut scrollback, &mut dirty);
        assert_eq!(scrollback.len(), 1);
        assert_eq!(scrollback.get(-1).unwrap()[0].ch, 'a');
    }

    #[test]
    fn erase_display_mode_2_clears_everything_but_not_scrollback() {
        let (mut screen, mut scrollback, mut dirty) = fixture();
        screen.grid_mut()[0][0].ch = 'x';
        screen.scroll_up(1, &mut scrollback, &mut dirty);
        screen.erase_display(2, &mut scrollback, &mut dirty);
        assert!(screen.grid().iter().flatten().all(|g| *g == Glyph::default()));
        assert_eq!(scrollback.len(), 1);
    }

    #[test]
    fn erase_display_mode_3_also_clears_scrollback() {
        let (mut screen, mut scrollback, mut dirty) = fixture();
        screen.scroll_up(1, &mut scrollback, &mut dirty);
        screen.erase_display(3, &mut scrollback, &mut dirty);
        assert_eq!(scrollback.len(), 0);
    }

    #[test]
    fn cursor_to_clamps_inside_screen() {
        let (mut screen, ..) = fixture();
        screen.cursor_to(100, 100);
        assert_eq!(screen.cursor.row, 4);
        assert_eq!(screen.cursor.col, 9);
    }

    #[test]
    fn insert_and_delete_chars_shift_row() {
        let (mut screen, _, mut dirty) = fixture();
        screen.grid_mut()[0][0].ch = 'a';
        screen.grid_mut()[0][1].ch = 'b';
        screen.insert_chars(1, &mut dirty);
        assert_eq!(screen.grid()[0][0].ch, ' ');
        assert_eq!(screen.grid()[0][1].ch, 'a');
        screen.delete_chars(1, &mut dirty);
        assert_eq!(screen.grid()[0][0].ch, 'a');
    }

    #[test]
    fn set_scroll_region_confines_insert_delete_lines() {
        let (mut screen, _, mut dirty) = fixture();
        screen.set_scroll_region(Some(2), Some(4));
        assert_eq!(screen.scroll_region, super::super::screen::ScrollRegion { top: 1, bottom: 3 });
        screen.cursor.row = 0;
        screen.insert_lines(1, &mut dirty); // row 0 is outside the region: no-op
        assert!(dirty.dirty().is_empty());
    }
}
