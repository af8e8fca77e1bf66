// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Reconstructs historical screens from the event log and drives the
//! in-terminal copy-mode viewport over them.

use super::{address::Address,
            mode::Mode,
            search::Match,
            viewport::{max_offset, min_offset, Offset, ViewportSize}};
use crate::core::{config::DEFAULT_SCROLLBACK_CAPACITY,
                   emulator::{Emulator, Glyph},
                   event_log::{Event, EventKind}};

fn apply_full(emulator: &mut Emulator, event: &Event) {
    match &event.kind {
        EventKind::Output(bytes) => {
            emulator.write(bytes);
        }
        EventKind::Resize { cols, rows } => emulator.resize(*cols as usize, *rows as usize),
        EventKind::Input(_) => {}
    }
}

fn apply_partial(emulator: &mut Emulator, event: &Event, normalized_offset: isize) {
    match &event.kind {
        EventKind::Output(bytes) => {
            let take = if normalized_offset < 0 { bytes.len() } else { (normalized_offset as usize + 1).min(bytes.len()) };
            emulator.write(&bytes[..take]);
        }
        EventKind::Resize { cols, rows } => emulator.resize(*cols as usize, *rows as usize),
        EventKind::Input(_) => {}
    }
}

/// Seeks the log forward/backward, maintains a copy-mode viewport over the
/// reconstructed screen, and owns the current search state. Replaying from an
/// arbitrary index always walks from the start of the log — the design
/// explicitly allows implementations with no keyframe acceleration.
pub struct ReplayEngine {
    events: Vec<Event>,
    location: Address,
    terminal: Emulator,
    mode: Mode,
    viewport: ViewportSize,
    /// Copy-mode cursor, in viewport-relative `(row, col)` coordinates.
    cursor: (usize, usize),
    desired_col: usize,
    offset: Offset,
    matches: Vec<Match>,
    is_forward: bool,
    select_start: Option<(usize, usize)>,
    is_selecting: bool,
    search_input: String,
}

impl ReplayEngine {
    #[must_use]
    pub fn new(events: Vec<Event>, viewport: ViewportSize) -> Self {
        let terminal = Emulator::with_scrollback_capacity(viewport.cols.max(1), viewport.rows.max(1), DEFAULT_SCROLLBACK_CAPACITY);
        let location = if events.is_empty() { Address::new(0, -1) } else { Address::new(events.len() - 1, -1) };
        let mut engine = Self {
            events,
            location,
            terminal,
            mode: Mode::Time,
            viewport,
            cursor: (0, 0),
            desired_col: 0,
            offset: Offset::default(),
            matches: Vec::new(),
            is_forward: true,
            select_start: None,
            is_selecting: false,
            search_input: String::new(),
        };
        engine.goto_index(engine.location.index, engine.location.offset);
        engine
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    #[must_use]
    pub fn mode(&self) -> Mode { self.mode }

    #[must_use]
    pub fn location(&self) -> Address { self.location }

    #[must_use]
    pub fn terminal(&self) -> &Emulator { &self.terminal }

    #[must_use]
    pub fn offset(&self) -> Offset { self.offset }

    #[must_use]
    pub fn cursor(&self) -> (usize, usize) { self.cursor }

    /// Reconstructs the emulator's state at `(index, offset)` by replaying
    /// every event from the start of the log. A no-op on an empty log.
    pub fn goto_index(&mut self, index: usize, offset: isize) {
        if self.events.is_empty() {
            self.location = Address::new(0, -1);
            return;
        }
        let index = index.min(self.events.len() - 1);
        let mut emulator = Emulator::with_scrollback_capacity(self.viewport.cols.max(1), self.viewport.rows.max(1), DEFAULT_SCROLLBACK_CAPACITY);
        for event in &self.events[..index] {
            apply_full(&mut emulator, event);
        }
        let normalized = Address::new(index, offset).normalize(&self.events);
        apply_partial(&mut emulator, &self.events[index], normalized.offset);
        self.terminal = emulator;
        self.location = normalized;
        self.refresh_bounds();
    }

    #[must_use]
    pub fn min_offset(&self) -> Offset { min_offset(self.terminal.history().len()) }

    #[must_use]
    pub fn max_offset(&self) -> Offset { max_offset(self.terminal.rows(), self.terminal.cols(), self.viewport) }

    fn refresh_bounds(&mut self) {
        self.offset = self.offset.clamp(self.min_offset(), self.max_offset());
    }

    /// Enters copy mode looking at the current ("live") position: the
    /// viewport's bottom row, offset all the way forward. From here,
    /// `CursorDown` past the last line is a no-op — there is nothing later
    /// than "now" to scroll into.
    pub fn enter_copy_mode(&mut self) {
        self.mode = Mode::Copy;
        self.offset = self.max_offset();
        self.cursor = (self.viewport.rows.saturating_sub(1), 0);
        self.desired_col = 0;
    }

    pub fn quit_copy_mode(&mut self) {
        self.mode = Mode::Time;
        self.offset = Offset::default();
        self.is_selecting = false;
        self.select_start = None;
    }

    /// Renders the row at absolute terminal row `row` (negative = scrollback,
    /// `0..rows` = live screen), for desired-column clamping and rendering.
    fn rendered_row(&self, row: isize) -> Vec<Glyph> {
        if row < 0 {
            self.terminal.history().get(row).map(<[Glyph]>::to_vec).unwrap_or_default()
        } else {
            self.terminal.screen().grid.get(row as usize).cloned().unwrap_or_default()
        }
    }

    fn line_len(&self, row: isize) -> usize {
        let rendered = self.rendered_row(row);
        rendered.iter().rposition(|glyph| glyph.ch != ' ').map_or(0, |last| last + 1)
    }

    fn absolute_row(&self) -> isize { self.offset.row + self.cursor.0 as isize }

    fn clamp_cursor_col_to_line(&mut self) {
        let len = self.line_len(self.absolute_row());
        self.cursor.1 = self.desired_col.min(len.saturating_sub(1).max(0)).min(self.viewport.cols.saturating_sub(1));
    }

    /// Moves the cursor up one row, preserving `desiredCol` across short lines
    /// (vi-like). Scrolls the viewport when the cursor is already at its top
    /// edge and there is room in history.
    pub fn cursor_up(&mut self) {
        if self.cursor.0 > 0 {
            self.cursor.0 -= 1;
        } else {
            let min = self.min_offset();
            if self.offset.row > min.row {
                self.offset.row -= 1;
            }
        }
        self.clamp_cursor_col_to_line();
    }

    /// Moves the cursor down one row. A no-op past the last occupied line
    /// within the current row; otherwise scrolls the viewport if there's room.
    pub fn cursor_down(&mut self) {
        let next_row = self.absolute_row() + 1;
        if next_row >= self.terminal.rows() as isize && self.offset.row >= self.max_offset().row {
            return;
        }
        if self.cursor.0 + 1 < self.viewport.rows {
            self.cursor.0 += 1;
        } else {
            let max = self.max_offset();
            if self.offset.row < max.row {
                self.offset.row += 1;
            }
        }
        self.clamp_cursor_col_to_line();
    }

    pub fn cursor_left(&mut self) {
        self.cursor.1 = self.cursor.1.saturating_sub(1);
        self.desired_col = self.cursor.1;
    }

    pub fn cursor_right(&mut self) {
        let len = self.line_len(self.absolute_row());
        if self.cursor.1 + 1 < self.viewport.cols.min(len.max(1)) {
            self.cursor.1 += 1;
        }
        self.desired_col = self.cursor.1;
    }

    /// Scrolls the viewport up by one row, keeping the cursor pinned to the
    /// same absolute terminal row until it reaches the viewport's top edge.
    pub fn scroll_up(&mut self) {
        let min = self.min_offset();
        if self.offset.row > min.row {
            self.offset.row -= 1;
            if self.cursor.0 + 1 < self.viewport.rows {
                self.cursor.0 += 1;
            }
        }
        self.clamp_cursor_col_to_line();
    }

    /// Scrolls the viewport down by one row, symmetric to [`Self::scroll_up`].
    pub fn scroll_down(&mut self) {
        let max = self.max_offset();
        if self.offset.row < max.row {
            self.offset.row += 1;
            self.cursor.0 = self.cursor.0.saturating_sub(1);
        }
        self.clamp_cursor_col_to_line();
    }

    pub fn action_beginning(&mut self) {
        self.offset.row = self.min_offset().row;
        self.cursor = (0, 0);
    }

    pub fn action_end(&mut self) {
        self.offset.row = self.max_offset().row;
        self.cursor.0 = self.viewport.rows.saturating_sub(1);
    }

    pub fn toggle_selecting(&mut self) {
        self.is_selecting = !self.is_selecting;
        self.select_start = if self.is_selecting { Some((self.absolute_row() as usize, self.cursor.1)) } else { None };
    }

    #[must_use]
    pub fn is_selecting(&self) -> bool { self.is_selecting }

    pub fn set_matches(&mut self, matches: Vec<Match>) { self.matches = matches; }

    #[must_use]
    pub fn matches(&self) -> &[Match] { &self.matches }

    pub fn set_search_input(&mut self, input: String) {
        self.search_input = input;
        self.mode = Mode::Input;
    }

    #[must_use]
    pub fn search_input(&self) -> &str { &self.search_input }

    /// Advances to the next (or previous) match relative to [`Self::location`].
    /// If `is_forward` differs from the stored search direction, the direction
    /// flips. Wraps around the log when no match remains ahead (or behind).
    pub fn search_again(&mut self, is_forward: bool) -> Option<Address> {
        if is_forward != self.is_forward {
            self.is_forward = is_forward;
        }
        if self.matches.is_empty() {
            return None;
        }
        let next = if self.is_forward {
            self.matches
                .iter()
                .map(|m| m.begin)
                .find(|begin| *begin > self.location)
                .or_else(|| self.matches.iter().map(|m| m.begin).min())
        } else {
            self.matches
                .iter()
                .map(|m| m.begin)
                .filter(|begin| *begin < self.location)
                .max()
                .or_else(|| self.matches.iter().map(|m| m.begin).max())
        };
        if let Some(address) = next {
            self.goto_index(address.index, address.offset);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::event_log::{Event, Simulator};

    fn viewport(rows: usize, cols: usize) -> ViewportSize { ViewportSize { rows, cols } }

    #[test]
    fn goto_index_reproduces_partial_offsets() {
        let mut sim = Simulator::new();
        sim.add("test", None);
        sim.add("take", None);
        let events = sim.build();
        let mut engine = ReplayEngine::new(events, viewport(5, 20));

        engine.goto_index(0, 0);
        assert_eq!(engine.terminal().screen().grid[0][0].ch, 't');
        assert_eq!(engine.terminal().screen().grid[0][1].ch, ' ');

        engine.goto_index(0, 1);
        assert_eq!(engine.terminal().screen().grid[0][1].ch, 'e');

        engine.goto_index(0, -1);
        let row: String = engine.terminal().screen().grid[0][..4].iter().map(|g| g.ch).collect();
        assert_eq!(row, "test");
    }

    #[test]
    fn empty_log_does_not_error_on_cursor_move() {
        let mut engine = ReplayEngine::new(Vec::new(), viewport(3, 10));
        engine.enter_copy_mode();
        let before = engine.cursor();
        engine.cursor_down();
        assert_eq!(engine.cursor(), before);
    }

    #[test]
    fn cursor_down_at_live_edge_is_a_no_op() {
        let events = vec![Event::resize(std::time::SystemTime::UNIX_EPOCH, 10, 5)];
        let mut engine = ReplayEngine::new(events, viewport(3, 10));
        engine.enter_copy_mode();
        let before = engine.cursor();
        engine.cursor_down();
        assert_eq!(engine.cursor(), before);
    }

    #[test]
    fn viewport_offset_stays_within_bounds() {
        let mut sim = Simulator::new();
        sim.add("hello", Some((20, 20)));
        let events = sim.build();
        let mut engine = ReplayEngine::new(events, viewport(10, 10));
        engine.enter_copy_mode();
        let min = engine.min_offset();
        let max = engine.max_offset();
        assert!(engine.offset().row >= min.row && engine.offset().row <= max.row);
        assert_eq!(max.row, 10);
    }

    #[test]
    fn search_again_wraps_forward() {
        let mut sim = Simulator::new();
        sim.add("test", None);
        sim.add("x", None);
        sim.add("test", None);
        let events = sim.build();
        let total = events.len() - 1;
        let mut engine = ReplayEngine::new(events, viewport(5, 20));
        engine.set_matches(vec![Match {
            begin: Address::new(0, 0),
            end: Address::new(0, -1),
            appearances: vec![],
        }, Match {
            begin: Address::new(total, 0),
            end: Address::new(total, -1),
            appearances: vec![],
        }]);
        engine.goto_index(total, -1);
        let wrapped = engine.search_again(true);
        assert_eq!(wrapped, Some(Address::new(0, 0)));
    }
}
