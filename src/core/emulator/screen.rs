// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The rectangular grid of [`Glyph`]s plus cursor, mode, and scroll-region state.

use super::glyph::Glyph;

/// Cursor rendering styles settable via DECSCUSR; we only need to track which one
/// is active, not render it ourselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Block,
    Underline,
    Bar,
}

/// Cursor position and visual state. `row`/`col` are always inside the screen
/// (invariant enforced by every [`Screen`] method that moves it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
    pub visible: bool,
    pub style: CursorStyle,
}

impl Default for Cursor {
    fn default() -> Self { Self { row: 0, col: 0, visible: true, style: CursorStyle::default() } }
}

/// Inclusive top/bottom rows of the DECSTBM scroll region, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRegion {
    pub top: usize,
    pub bottom: usize,
}

/// Mode flags toggled by SM/RM and DECSET/DECRST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modes {
    /// IRM: characters are inserted rather than overwritten.
    pub insert: bool,
    /// DECOM: cursor addressing is relative to the scroll region.
    pub origin: bool,
    /// DECAWM: wrap to the next line at the right margin.
    pub autowrap: bool,
    /// LNM: treat LF as CR+LF.
    pub crlf_on_lf: bool,
    /// Bracketed-paste mode (2004); the emulator only tracks the flag — the PTY
    /// writer decides whether to wrap pasted input in the bracket sequences.
    pub bracketed_paste: bool,
    /// Deferred-wrap flag: the cursor sits one column past the right margin and
    /// the wrap happens just before the *next* printable character, per xterm's
    /// "last column" behavior.
    pub wrap_pending: bool,
}

/// A full cursor save/restore snapshot (DECSC/DECRC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedCursor {
    pub row: usize,
    pub col: usize,
    pub origin: bool,
}

/// Row-major grid of glyphs, `rows x cols`, at least `1x1`.
pub type Grid = Vec<Vec<Glyph>>;

fn blank_grid(rows: usize, cols: usize) -> Grid { vec![vec![Glyph::default(); cols]; rows] }

/// The terminal screen: primary buffer, alternate buffer, cursor, and mode state.
///
/// Entering the alt screen (xterm modes 47/1047/1049) swaps to a fresh empty buffer;
/// scrollback is only ever produced from the primary buffer.
#[derive(Debug, Clone)]
pub struct Screen {
    pub rows: usize,
    pub cols: usize,
    primary: Grid,
    alternate: Grid,
    pub alt_active: bool,
    pub cursor: Cursor,
    pub saved_cursor: Option<SavedCursor>,
    pub scroll_region: ScrollRegion,
    pub modes: Modes,
    pub title: String,
}

impl Screen {
    /// # Panics
    /// Panics if `rows == 0 || cols == 0`; the data model requires `rows x cols >=
    /// 1x1`.
    #[must_use]
    pub fn new(cols: usize, rows: usize) -> Self {
        assert!(rows > 0 && cols > 0, "screen dimensions must be at least 1x1");
        Self {
            rows,
            cols,
            primary: blank_grid(rows, cols),
            alternate: blank_grid(rows, cols),
            alt_active: false,
            cursor: Cursor::default(),
            saved_cursor: None,
            scroll_region: ScrollRegion { top: 0, bottom: rows - 1 },
            modes: Modes { autowrap: true, ..Modes::default() },
            title: String::new(),
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid { if self.alt_active { &self.alternate } else { &self.primary } }

    pub fn grid_mut(&mut self) -> &mut Grid { if self.alt_active { &mut self.alternate } else { &mut self.primary } }

    pub fn row(&self, index: usize) -> Option<&[Glyph]> { self.grid().get(index).map(Vec::as_slice) }

    /// Swaps to the alternate buffer, clearing it first (xterm's 1049 semantics).
    pub fn enter_alt_screen(&mut self) {
        if self.alt_active {
            return;
        }
        self.alternate = blank_grid(self.rows, self.cols);
        self.alt_active = true;
    }

    /// Swaps back to the primary buffer, leaving it exactly as it was.
    pub fn leave_alt_screen(&mut self) { self.alt_active = false; }

    /// Resizes by truncating or extending rows/columns, preserving existing
    /// content in the overlapping region. No reflow. Clamps the cursor and scroll
    /// region. Scrollback is untouched — it lives outside [`Screen`].
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        for grid in [&mut self.primary, &mut self.alternate] {
            resize_grid(grid, cols, rows);
        }
        self.rows = rows;
        self.cols = cols;
        self.cursor.row = self.cursor.row.min(rows - 1);
        self.cursor.col = self.cursor.col.min(cols - 1);
        self.scroll_region = ScrollRegion { top: 0, bottom: rows - 1 };
    }
}

fn resize_grid(grid: &mut Grid, cols: usize, rows: usize) {
    grid.resize_with(rows, || vec![Glyph::default(); cols]);
    for row in grid.iter_mut() {
        row.resize(cols, Glyph::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_screen_has_default_glyphs() {
        let screen = Screen::new(10, 5);
        assert_eq!(screen.grid().len(), 5);
        assert_eq!(screen.grid()[0].len(), 10);
        assert_eq!(screen.grid()[0][0], Glyph::default());
    }

    #[test]
    fn alt_screen_is_fresh_and_restores_primary() {
        let mut screen = Screen::new(4, 2);
        screen.grid_mut()[0][0].ch = 'x';
        screen.enter_alt_screen();
        assert_eq!(screen.grid()[0][0], Glyph::default());
        screen.grid_mut()[0][0].ch = 'y';
        screen.leave_alt_screen();
        assert_eq!(screen.grid()[0][0].ch, 'x');
    }

    #[test]
    fn resize_clamps_cursor() {
        let mut screen = Screen::new(10, 10);
        screen.cursor.row = 9;
        screen.cursor.col = 9;
        screen.resize(5, 5);
        assert_eq!(screen.cursor.row, 4);
        assert_eq!(screen.cursor.col, 4);
        assert_eq!(screen.scroll_region, ScrollRegion { top: 0, bottom: 4 });
    }

    #[test]
    fn resize_preserves_overlapping_content() {
        let mut screen = Screen::new(5, 5);
        screen.grid_mut()[0][0].ch = 'z';
        screen.resize(10, 10);
        assert_eq!(screen.grid()[0][0].ch, 'z');
    }
}
