// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! On-disk persistence for the event log.
//!
//! Layout: `CYLOG\x01` magic, little-endian `u32` version, then records of
//! `{u8 kind, u64 unix_nanos, u32 length, bytes payload}`. A reader that hits a
//! truncated trailing record stops there and returns everything read so far —
//! a daemon killed mid-write never loses the complete records that came before.

use std::{fs::File,
          io::{self, Read, Write},
          path::Path,
          time::{Duration, SystemTime}};

use super::event::{Event, EventKind};

/// File-type marker written at the start of every log file.
pub const MAGIC: &[u8; 6] = b"CYLOG\x01";

/// Current on-disk format version.
pub const VERSION: u32 = 1;

const KIND_OUTPUT: u8 = 0;
const KIND_INPUT: u8 = 1;
const KIND_RESIZE: u8 = 2;

fn unix_nanos(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

fn from_unix_nanos(nanos: u64) -> SystemTime { SystemTime::UNIX_EPOCH + Duration::from_nanos(nanos) }

/// Writes `events` to `path`, overwriting any existing file.
///
/// # Errors
/// Returns [`crate::core::error::VtmuxError::Io`] if the file cannot be created
/// or written.
pub fn save(path: &Path, events: &[Event]) -> crate::core::error::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(MAGIC)?;
    file.write_all(&VERSION.to_le_bytes())?;
    for event in events {
        write_record(&mut file, event)?;
    }
    Ok(())
}

fn write_record(file: &mut File, event: &Event) -> io::Result<()> {
    let (kind, payload): (u8, Vec<u8>) = match &event.kind {
        EventKind::Output(bytes) => (KIND_OUTPUT, bytes.clone()),
        EventKind::Input(bytes) => (KIND_INPUT, bytes.clone()),
        EventKind::Resize { cols, rows } => {
            let mut payload = Vec::with_capacity(4);
            payload.extend_from_slice(&cols.to_le_bytes());
            payload.extend_from_slice(&rows.to_le_bytes());
            (KIND_RESIZE, payload)
        }
    };
    file.write_all(&[kind])?;
    file.write_all(&unix_nanos(event.timestamp).to_le_bytes())?;
    file.write_all(&(payload.len() as u32).to_le_bytes())?;
    file.write_all(&payload)?;
    Ok(())
}

/// Reads every complete event from `path`. A truncated trailing record (the
/// process was killed mid-write) is silently dropped rather than surfaced as an
/// error; everything read up to that point is returned.
///
/// # Errors
/// Returns [`crate::core::error::VtmuxError::Parse`] if the file doesn't start
/// with the expected magic, or [`crate::core::error::VtmuxError::Io`] if it
/// can't be opened.
pub fn load(path: &Path) -> crate::core::error::Result<Vec<Event>> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 10];
    if !read_exact_or_eof(&mut file, &mut header)? || &header[..6] != MAGIC {
        return Err(crate::core::error::VtmuxError::Parse("missing or invalid CYLOG header".to_string()));
    }

    let mut events = Vec::new();
    loop {
        match read_record(&mut file) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => break,
            Err(err) => return Err(err),
        }
    }
    Ok(events)
}

fn read_record(file: &mut File) -> crate::core::error::Result<Option<Event>> {
    let mut prefix = [0u8; 13];
    if !read_exact_or_eof(file, &mut prefix)? {
        return Ok(None);
    }
    let kind = prefix[0];
    let nanos = u64::from_le_bytes(prefix[1..9].try_into().unwrap());
    let length = u32::from_le_bytes(prefix[9..13].try_into().unwrap()) as usize;

    let mut payload = vec![0u8; length];
    if !read_exact_or_eof(file, &mut payload)? {
        return Ok(None);
    }

    let timestamp = from_unix_nanos(nanos);
    let event = match kind {
        KIND_OUTPUT => Event::output(timestamp, payload),
        KIND_INPUT => Event::input(timestamp, payload),
        KIND_RESIZE if payload.len() == 4 => {
            let cols = u16::from_le_bytes(payload[0..2].try_into().unwrap());
            let rows = u16::from_le_bytes(payload[2..4].try_into().unwrap());
            Event::resize(timestamp, cols, rows)
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

/// Reads exactly `buf.len()` bytes, or returns `Ok(false)` if the file ends
/// before `buf` is full (a truncated trailing record).
fn read_exact_or_eof(file: &mut File, buf: &mut [u8]) -> io::Result<bool> {
    match file.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Seek;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn round_trip_preserves_events() {
        let file = NamedTempFile::new().unwrap();
        let events = vec![
            Event::output(SystemTime::now(), b"hello".to_vec()),
            Event::resize(SystemTime::now(), 80, 24),
            Event::input(SystemTime::now(), b"ls\n".to_vec()),
        ];
        save(file.path(), &events).unwrap();
        let loaded = load(file.path()).unwrap();
        assert_eq!(loaded.len(), events.len());
        for (original, reloaded) in events.iter().zip(loaded.iter()) {
            assert_eq!(original.kind, reloaded.kind);
        }
    }

    #[test]
    fn truncated_trailing_record_is_dropped_not_errored() {
        let mut file = NamedTempFile::new().unwrap();
        let events = vec![Event::output(SystemTime::now(), b"complete".to_vec())];
        save(file.path(), &events).unwrap();

        // Append a partial record header (claims a long payload that never arrives).
        let mut handle = file.reopen().unwrap();
        handle.seek(std::io::SeekFrom::End(0)).unwrap();
        handle.write_all(&[0u8]).unwrap();
        handle.write_all(&0u64.to_le_bytes()).unwrap();
        handle.write_all(&1000u32.to_le_bytes()).unwrap();
        handle.write_all(b"short").unwrap();
        drop(handle);

        let loaded = load(file.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].kind, EventKind::Output(b"complete".to_vec()));
        // keep `file` alive until the end of the test
        let _ = &mut file;
    }

    #[test]
    fn empty_log_round_trips_to_nothing() {
        let file = NamedTempFile::new().unwrap();
        save(file.path(), &[]).unwrap();
        assert_eq!(load(file.path()).unwrap(), []);
    }

    #[test]
    fn bad_magic_is_a_parse_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a vtmux log at all").unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, crate::core::error::VtmuxError::Parse(_)));
    }
}
