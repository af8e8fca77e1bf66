// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A position within the event stream: an event index plus a byte offset into
//! that event's payload.

use std::cmp::Ordering;

use crate::core::event_log::Event;

/// `{index, offset}` into the event log. `offset == -1` means "the last byte of
/// that event" — a convenience so callers can say "the end of event N" without
/// knowing its payload length up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub index: usize,
    pub offset: isize,
}

impl Address {
    #[must_use]
    pub fn new(index: usize, offset: isize) -> Self { Self { index, offset } }

    /// The address of the very start of the log.
    #[must_use]
    pub fn start() -> Self { Self { index: 0, offset: 0 } }

    /// Clamps `offset` to `[-1, len(payload)-1]` and resolves `-1` to the
    /// concrete last-byte index, given the log it addresses into.
    #[must_use]
    pub fn normalize(self, events: &[Event]) -> Self {
        let Some(event) = events.get(self.index) else { return self };
        let len = event.payload_len();
        if len == 0 {
            return Self { index: self.index, offset: -1 };
        }
        let last = len as isize - 1;
        let offset = if self.offset < 0 { last } else { self.offset.min(last) };
        Self { index: self.index, offset }
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

/// Totally orders by `(index, offset)`. Callers comparing addresses that may
/// still carry the `-1` "last byte" sentinel should [`Address::normalize`]
/// both sides against the same event log first — an un-normalized `-1` sorts
/// before every non-negative offset, which is usually not what's wanted.
impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering { self.index.cmp(&other.index).then(self.offset.cmp(&other.offset)) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::event_log::Event;

    #[test]
    fn normalize_resolves_last_byte_sentinel() {
        let events = vec![Event::output(std::time::SystemTime::UNIX_EPOCH, b"test".to_vec())];
        let address = Address::new(0, -1).normalize(&events);
        assert_eq!(address.offset, 3);
    }

    #[test]
    fn normalize_clamps_overshoot() {
        let events = vec![Event::output(std::time::SystemTime::UNIX_EPOCH, b"ab".to_vec())];
        let address = Address::new(0, 50).normalize(&events);
        assert_eq!(address.offset, 1);
    }

    #[test]
    fn ordering_is_lexicographic_by_index_then_offset() {
        assert!(Address::new(1, 0) > Address::new(0, 99));
        assert!(Address::new(2, 3) > Address::new(2, 1));
    }
}
