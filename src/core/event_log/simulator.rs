// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A deterministic event-log builder for tests.
//!
//! [`crate::core::event_log::Recorder`] stamps events with [`std::time::SystemTime::now`],
//! which makes scenario tests ("search finds two matches", "gotoIndex partial
//! offset") nondeterministic and hard to assert on. `Simulator` builds the same
//! `Vec<Event>` shape with a synthetic clock that advances by a fixed step per
//! call, so tests can assert on exact timestamps and exact event counts.

use std::time::{Duration, SystemTime};

use super::event::Event;

/// Builds an event sequence with a synthetic, monotonically advancing clock.
pub struct Simulator {
    events: Vec<Event>,
    clock: SystemTime,
    step: Duration,
}

impl Default for Simulator {
    fn default() -> Self { Self::new() }
}

impl Simulator {
    #[must_use]
    pub fn new() -> Self { Self { events: Vec::new(), clock: SystemTime::UNIX_EPOCH, step: Duration::from_millis(10) } }

    fn tick(&mut self) -> SystemTime {
        let now = self.clock;
        self.clock += self.step;
        now
    }

    /// Appends an `Output` event carrying `text`. If `size` is given, a
    /// `Resize` event is synthesised immediately before it — mirroring what a
    /// pane does when a client attaches mid-write with a different viewport.
    pub fn add(&mut self, text: &str, size: Option<(u16, u16)>) -> &mut Self {
        if let Some((cols, rows)) = size {
            let timestamp = self.tick();
            self.events.push(Event::resize(timestamp, cols, rows));
        }
        let timestamp = self.tick();
        self.events.push(Event::output(timestamp, text.as_bytes().to_vec()));
        self
    }

    /// Appends a bare `Resize` event with no accompanying output.
    pub fn resize(&mut self, cols: u16, rows: u16) -> &mut Self {
        let timestamp = self.tick();
        self.events.push(Event::resize(timestamp, cols, rows));
        self
    }

    #[must_use]
    pub fn build(&self) -> Vec<Event> { self.events.clone() }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::event_log::event::EventKind;

    #[test]
    fn add_without_size_appends_only_output() {
        let mut sim = Simulator::new();
        sim.add("hello", None);
        assert_eq!(sim.build().len(), 1);
    }

    #[test]
    fn add_with_size_synthesises_resize_first() {
        let mut sim = Simulator::new();
        sim.add("hello", Some((80, 24)));
        let events = sim.build();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].kind, EventKind::Resize { cols: 80, rows: 24 }));
        assert!(matches!(events[1].kind, EventKind::Output(_)));
        assert!(events[0].timestamp < events[1].timestamp);
    }

    #[test]
    fn clock_advances_deterministically() {
        let mut sim = Simulator::new();
        sim.add("a", None);
        sim.add("b", None);
        let events = sim.build();
        assert!(events[0].timestamp < events[1].timestamp);
    }
}
