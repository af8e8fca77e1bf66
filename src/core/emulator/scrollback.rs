// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A bounded ring of completed rows evicted from the top of the primary screen.

use std::collections::VecDeque;

use super::glyph::Glyph;

/// Rows evicted from the top of the primary buffer as new lines scroll in.
/// Indexed by negative row offsets relative to the top of the live screen: row `-1`
/// is the most recently evicted row, row `-len` is the oldest row still retained.
#[derive(Debug, Clone)]
pub struct Scrollback {
    capacity: usize,
    rows: VecDeque<Vec<Glyph>>,
}

impl Scrollback {
    #[must_use]
    pub fn new(capacity: usize) -> Self { Self { capacity, rows: VecDeque::with_capacity(capacity.min(1024)) } }

    #[must_use]
    pub fn capacity(&self) -> usize { self.capacity }

    #[must_use]
    pub fn len(&self) -> usize { self.rows.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Pushes a completed row to the bottom of scrollback (i.e. the row that was
    /// just scrolled off the top of the live screen). Evicts the oldest row first
    /// when at capacity.
    pub fn push(&mut self, row: Vec<Glyph>) {
        if self.capacity == 0 {
            return;
        }
        if self.rows.len() == self.capacity {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
    }

    /// Row at negative offset `neg_index` (`-1` = most recent). Returns `None` if
    /// out of range.
    #[must_use]
    pub fn get(&self, neg_index: isize) -> Option<&[Glyph]> {
        if neg_index >= 0 {
            return None;
        }
        let from_back = (-neg_index) as usize - 1; // -1 -> 0 (most recent, at the back)
        let len = self.rows.len();
        if from_back >= len {
            return None;
        }
        self.rows.get(len - 1 - from_back).map(Vec::as_slice)
    }

    /// Drops all retained rows. Used when the alt screen is entered (scrollback is
    /// only ever associated with the primary buffer) is handled by the caller not
    /// writing to it; this is exposed for tests and explicit resets.
    pub fn clear(&mut self) { self.rows.clear(); }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.rows.len() > capacity {
            self.rows.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tag: char) -> Vec<Glyph> { vec![Glyph { ch: tag, ..Glyph::default() }] }

    #[test]
    fn push_beyond_capacity_evicts_oldest() {
        let mut sb = Scrollback::new(2);
        sb.push(row('a'));
        sb.push(row('b'));
        sb.push(row('c'));
        assert_eq!(sb.len(), 2);
        assert_eq!(sb.get(-1).unwrap()[0].ch, 'c');
        assert_eq!(sb.get(-2).unwrap()[0].ch, 'b');
        assert!(sb.get(-3).is_none());
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut sb = Scrollback::new(5);
        for tag in ['a', 'b', 'c', 'd', 'e', 'f', 'g'] {
            sb.push(row(tag));
            assert!(sb.len() <= sb.capacity());
        }
    }

    #[test]
    fn zero_capacity_retains_nothing() {
        let mut sb = Scrollback::new(0);
        sb.push(row('a'));
        assert_eq!(sb.len(), 0);
    }
}
