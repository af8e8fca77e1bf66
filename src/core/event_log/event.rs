// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A single, immutable entry in the session log.

use std::time::SystemTime;

/// What happened. `Input` is recorded for a faithful log but is never replayed
/// into a live PTY — replay only ever drives the emulator, not a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Bytes the PTY wrote toward the client.
    Output(Vec<u8>),
    /// Bytes a client wrote toward the PTY.
    Input(Vec<u8>),
    /// The pane's screen was resized.
    Resize { cols: u16, rows: u16 },
}

/// One append-only log entry: what happened, and when.
///
/// Events keep insertion order and are never mutated after being appended —
/// [`crate::core::replay::ReplayEngine`] seeks are pure reads over a slice of
/// these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub timestamp: SystemTime,
    pub kind: EventKind,
}

impl Event {
    #[must_use]
    pub fn output(timestamp: SystemTime, bytes: Vec<u8>) -> Self { Self { timestamp, kind: EventKind::Output(bytes) } }

    #[must_use]
    pub fn input(timestamp: SystemTime, bytes: Vec<u8>) -> Self { Self { timestamp, kind: EventKind::Input(bytes) } }

    #[must_use]
    pub fn resize(timestamp: SystemTime, cols: u16, rows: u16) -> Self { Self { timestamp, kind: EventKind::Resize { cols, rows } } }

    /// The payload length relevant to [`crate::core::replay::Address`] offsets:
    /// the byte count for `Output`, `0` for anything that has no byte-addressable
    /// payload.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        match &self.kind {
            EventKind::Output(bytes) => bytes.len(),
            EventKind::Input(_) | EventKind::Resize { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_len_tracks_output_bytes() {
        let event = Event::output(SystemTime::UNIX_EPOCH, b"hello".to_vec());
        assert_eq!(event.payload_len(), 5);
    }

    #[test]
    fn payload_len_is_zero_for_resize() {
        let event = Event::resize(SystemTime::UNIX_EPOCH, 80, 24);
        assert_eq!(event.payload_len(), 0);
    }
}
