// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Tracking of what changed since the last [`DirtyTracker::reset`].

use rustc_hash::FxHashSet;

/// Coarse changes that don't map to a single row: title updates, cursor-visibility
/// flips, mode changes, and the bell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeMask {
    pub screen: bool,
    pub title: bool,
    pub cursor_visibility: bool,
    pub mode: bool,
    pub bell: bool,
}

impl ChangeMask {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.screen || self.title || self.cursor_visibility || self.mode || self.bell)
    }
}

/// Rows changed since the last reset, plus the coarse [`ChangeMask`]. Cleared only
/// by an explicit [`DirtyTracker::reset`] call — writes never clear it themselves.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    rows: FxHashSet<usize>,
    mask: ChangeMask,
}

impl DirtyTracker {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn mark_row(&mut self, row: usize) {
        self.rows.insert(row);
        self.mask.screen = true;
    }

    pub fn mark_title(&mut self) { self.mask.title = true; }

    pub fn mark_cursor_visibility(&mut self) { self.mask.cursor_visibility = true; }

    pub fn mark_mode(&mut self) { self.mask.mode = true; }

    pub fn mark_bell(&mut self) { self.mask.bell = true; }

    #[must_use]
    pub fn dirty(&self) -> &FxHashSet<usize> { &self.rows }

    #[must_use]
    pub fn changed(&self) -> ChangeMask { self.mask }

    pub fn reset(&mut self) {
        self.rows.clear();
        self.mask = ChangeMask::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_then_dirty_is_empty() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_row(3);
        tracker.reset();
        assert!(tracker.dirty().is_empty());
        assert!(tracker.changed().is_empty());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_row(1);
        tracker.reset();
        tracker.reset();
        assert!(tracker.dirty().is_empty());
    }

    #[test]
    fn marked_rows_were_actually_written() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_row(0);
        tracker.mark_row(5);
        assert!(tracker.dirty().contains(&0));
        assert!(tracker.dirty().contains(&5));
        assert!(!tracker.dirty().contains(&1));
    }
}
