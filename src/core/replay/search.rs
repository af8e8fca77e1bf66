// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Regex search over the replayed screen across the event timeline.
//!
//! Modeled as a cancellable `tokio` task: [`spawn_search`] hands back a
//! [`tokio::task::JoinHandle`] and a progress receiver; dropping the handle
//! (or just not awaiting it) cancels the scan, and the handle carries whatever
//! matches were found up to the point it was dropped.

use regex::Regex;
use tokio::sync::mpsc;

use super::address::Address;
use crate::core::{emulator::{Emulator, Glyph},
                   error::{Result, VtmuxError},
                   event_log::{Event, EventKind}};

/// One continuous on-screen presence of a match, bounded by a `(from, to)`
/// `(row, col)` span and the address at which it stopped being visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appearance {
    pub from: (usize, usize),
    pub to: (usize, usize),
    pub end_address: Address,
}

/// A search hit spanning the interval during which the matched text was
/// visible on the emulated screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub begin: Address,
    pub end: Address,
    pub appearances: Vec<Appearance>,
}

/// Renders a candidate answer for "is the regex visible anywhere in the
/// screen, and where." Only the first matching row is reported — this crate
/// does not track more than one concurrently-open match at a time, which is
/// enough for the append/clear-driven sessions this engine replays (a new
/// match only opens once the previous one has closed in practice).
fn first_match_in_screen(regex: &Regex, grid: &[Vec<Glyph>]) -> Option<(String, (usize, usize), (usize, usize))> {
    for (row_index, row) in grid.iter().enumerate() {
        let text: String = row.iter().map(|glyph| glyph.ch).collect();
        if let Some(found) = regex.find(&text) {
            return Some((found.as_str().to_string(), (row_index, found.start()), (row_index, found.end())));
        }
    }
    None
}

struct Open {
    text: String,
    begin: Address,
    from: (usize, usize),
    to: (usize, usize),
}

fn close(matches: &mut Vec<Match>, open: Open, end: Address) {
    matches.push(Match {
        begin: open.begin,
        end,
        appearances: vec![Appearance { from: open.from, to: open.to, end_address: end }],
    });
}

/// Steps a secondary emulator forward across every `Output` event, looking for
/// `pattern`. Reports progress as an integer percent on `progress` roughly
/// every 8 events and always on the last one. Empty pattern yields an empty
/// result set without touching the emulator.
///
/// On error, whatever matches were already found are returned alongside the
/// error rather than discarded.
pub async fn search(events: &[Event], pattern: &str, cols: usize, rows: usize, progress: mpsc::Sender<u8>) -> (Vec<Match>, Result<()>) {
    let mut matches = Vec::new();
    if pattern.is_empty() {
        return (matches, Ok(()));
    }

    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => return (matches, Err(VtmuxError::from(err))),
    };

    let mut emulator = Emulator::new(cols.max(1), rows.max(1));
    let mut open: Option<Open> = None;
    let total = events.len().max(1);

    for (index, event) in events.iter().enumerate() {
        match &event.kind {
            EventKind::Output(bytes) => {
                emulator.write(bytes);
            }
            EventKind::Resize { cols, rows } => emulator.resize(*cols as usize, *rows as usize),
            EventKind::Input(_) => {}
        }

        let screen = emulator.screen();
        let found = first_match_in_screen(&regex, &screen.grid);

        open = match (open, found) {
            (None, Some((text, from, to))) => Some(Open { text, begin: Address::new(index, 0), from, to }),
            (Some(mut current), Some((text, from, to))) if current.text == text => {
                current.from = from;
                current.to = to;
                Some(current)
            }
            (Some(current), next) => {
                close(&mut matches, current, Address::new(index.saturating_sub(1), -1));
                next.map(|(text, from, to)| Open { text, begin: Address::new(index, 0), from, to })
            }
            (None, None) => None,
        };

        if index % 8 == 0 || index + 1 == events.len() {
            let percent = (((index + 1) * 100) / total) as u8;
            if progress.send(percent).await.is_err() {
                if let Some(current) = open {
                    close(&mut matches, current, Address::new(index, -1));
                }
                return (matches, Err(VtmuxError::Io("search progress receiver dropped".to_string())));
            }
        }
    }

    if let Some(current) = open {
        let last = events.len().saturating_sub(1);
        close(&mut matches, current, Address::new(last, -1));
    }

    (matches, Ok(()))
}

/// Spawns [`search`] as a cancellable task. Dropping the returned
/// [`tokio::task::JoinHandle`] (or aborting it) stops the scan; the progress
/// receiver is dropped along with it.
pub fn spawn_search(
    events: Vec<Event>,
    pattern: String,
    cols: usize,
    rows: usize,
) -> (tokio::task::JoinHandle<(Vec<Match>, Result<()>)>, mpsc::Receiver<u8>) {
    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(async move { search(&events, &pattern, cols, rows, tx).await });
    (handle, rx)
}

/// Parses a duration expression like `"+5s"`, `"-200ms"`, or `"1h"`. Returns
/// the signed delta in milliseconds, or `None` if `input` isn't a duration.
#[must_use]
pub fn parse_time_delta(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let unit_start = rest.find(|c: char| !c.is_ascii_digit())?;
    let (digits, unit) = rest.split_at(unit_start);
    if digits.is_empty() {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    let unit_ms = match unit {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        _ => return None,
    };
    Some(sign * value * unit_ms)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::core::event_log::Simulator;

    #[tokio::test]
    async fn empty_pattern_yields_no_matches() {
        let mut sim = Simulator::new();
        sim.add("hello", None);
        let (tx, _rx) = mpsc::channel(4);
        let (matches, result) = search(&sim.build(), "", 10, 5, tx).await;
        assert!(matches.is_empty());
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn finds_two_separated_matches() {
        let mut sim = Simulator::new();
        sim.add("\x1b[20h", None);
        sim.add("test string please ignore", None);
        sim.add("\x1b[2J\x1b[H", None);
        sim.add("take two", None);
        sim.add("\x1b[2J\x1b[H", None);
        sim.add("test", None);
        let (tx, _rx) = mpsc::channel(16);
        let (matches, result) = search(&sim.build(), "test", 40, 5, tx).await;
        assert!(result.is_ok());
        assert_eq!(matches.len(), 2);
    }

    #[test_case("+5s", Some(5_000); "plus seconds")]
    #[test_case("-200ms", Some(-200); "minus millis")]
    #[test_case("1h", Some(3_600_000); "bare hours default positive")]
    #[test_case("hello", None; "not a duration")]
    fn parses_time_deltas(input: &str, expected: Option<i64>) { assert_eq!(parse_time_delta(input), expected); }
}
