// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The public emulator contract: write bytes in, read back a screen snapshot,
//! cursor, scrollback, and dirty state.

use rustc_hash::FxHashSet;
use vte::Parser;

use super::{dirty::{ChangeMask, DirtyTracker},
            glyph::Glyph,
            performer::Performer,
            screen::{Cursor, Screen},
            scrollback::Scrollback};
use crate::core::config::DEFAULT_SCROLLBACK_CAPACITY;

/// A cheap-to-clone view of the screen at the moment [`Emulator::screen`] was
/// called. Cloning duplicates the grid; for the terminal sizes this crate targets
/// (tens of thousands of cells) that is a bounded, predictable cost, not an
/// unbounded one — scrollback is returned separately via [`Emulator::history`]
/// rather than folded into every snapshot.
#[derive(Debug, Clone)]
pub struct ScreenSnapshot {
    pub cols: usize,
    pub rows: usize,
    pub grid: Vec<Vec<Glyph>>,
    pub cursor: Cursor,
    pub title: String,
    pub alt_active: bool,
}

/// A byte-stream-driven VT500-family terminal emulator: consumes PTY output,
/// maintains a screen with scrollback, and tracks what changed since the last
/// reset. Never errors on malformed input — resynchronises at the next
/// recognisable command, per the VT parser's own recovery behavior.
pub struct Emulator {
    screen: Screen,
    scrollback: Scrollback,
    dirty: DirtyTracker,
    parser: Parser,
    // SGR attribute/color state must outlive any single `write()` call (a child
    // process can set bold in one write and print in the next), so it's carried
    // here rather than on the transient `Performer`.
    pending_fg: super::glyph::Color,
    pending_bg: super::glyph::Color,
    pending_attrs: super::glyph::Attrs,
}

impl Emulator {
    #[must_use]
    pub fn new(cols: usize, rows: usize) -> Self { Self::with_scrollback_capacity(cols, rows, DEFAULT_SCROLLBACK_CAPACITY) }

    #[must_use]
    pub fn with_scrollback_capacity(cols: usize, rows: usize, scrollback_capacity: usize) -> Self {
        Self {
            screen: Screen::new(cols, rows),
            scrollback: Scrollback::new(scrollback_capacity),
            dirty: DirtyTracker::new(),
            parser: Parser::new(),
            pending_fg: super::glyph::Color::Default,
            pending_bg: super::glyph::Color::Default,
            pending_attrs: super::glyph::Attrs::default(),
        }
    }

    /// Feeds `bytes` through the VT parser. Always succeeds — returns the number
    /// of bytes consumed (always `bytes.len()`); the `Result` in the contract
    /// exists for API symmetry with other I/O-shaped methods and is always `Ok`.
    pub fn write(&mut self, bytes: &[u8]) -> (usize, crate::core::error::Result<()>) {
        let mut performer = Performer {
            screen: &mut self.screen,
            scrollback: &mut self.scrollback,
            dirty: &mut self.dirty,
            pending_fg: self.pending_fg,
            pending_bg: self.pending_bg,
            pending_attrs: self.pending_attrs,
        };
        for &byte in bytes {
            self.parser.advance(&mut performer, byte);
        }
        self.pending_fg = performer.pending_fg;
        self.pending_bg = performer.pending_bg;
        self.pending_attrs = performer.pending_attrs;
        (bytes.len(), Ok(()))
    }

    /// Truncates or extends rows/columns; no reflow. Scrollback is preserved
    /// unchanged.
    pub fn resize(&mut self, cols: usize, rows: usize) { self.screen.resize(cols, rows); }

    #[must_use]
    pub fn screen(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            cols: self.screen.cols,
            rows: self.screen.rows,
            grid: self.screen.grid().clone(),
            cursor: self.screen.cursor,
            title: self.screen.title.clone(),
            alt_active: self.screen.alt_active,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor { self.screen.cursor }

    #[must_use]
    pub fn history(&self) -> &Scrollback { &self.scrollback }

    pub fn reset_changes(&mut self) { self.dirty.reset(); }

    #[must_use]
    pub fn dirty(&self) -> &FxHashSet<usize> { self.dirty.dirty() }

    #[must_use]
    pub fn changed(&self) -> ChangeMask { self.dirty.changed() }

    #[must_use]
    pub fn cols(&self) -> usize { self.screen.cols }

    #[must_use]
    pub fn rows(&self) -> usize { self.screen.rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_advances_cursor_and_marks_dirty() {
        let mut emulator = Emulator::new(10, 5);
        emulator.write(b"hi");
        assert_eq!(emulator.cursor().col, 2);
        assert!(emulator.dirty().contains(&0));
    }

    #[test]
    fn reset_changes_then_dirty_is_empty() {
        let mut emulator = Emulator::new(10, 5);
        emulator.write(b"hi");
        emulator.reset_changes();
        assert!(emulator.dirty().is_empty());
    }

    #[test]
    fn resize_preserves_scrollback() {
        let mut emulator = Emulator::new(5, 2);
        for _ in 0..5 {
            emulator.write(b"line\n");
        }
        let before = emulator.history().len();
        emulator.resize(8, 3);
        assert_eq!(emulator.history().len(), before);
    }

    #[test]
    fn malformed_escape_resynchronises() {
        let mut emulator = Emulator::new(10, 5);
        emulator.write(b"\x1b[9999zabc");
        // The bogus final byte 'z' is simply not dispatched; subsequent plain text
        // still prints normally.
        assert_eq!(emulator.screen().grid[0][0].ch, 'a');
    }

    #[test]
    fn sgr_bold_persists_across_writes() {
        let mut emulator = Emulator::new(10, 5);
        emulator.write(b"\x1b[1m");
        emulator.write(b"x");
        assert!(emulator.screen().grid[0][0].attrs.bold);
    }
}
