// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The framed binary protocol spoken between the daemon and an attached
//! client. Each frame is one [`Message`], written as a `u64` little-endian
//! length prefix followed by that many payload bytes (tag byte first, then
//! the tag's fields). Strings are length-prefixed with a `u32`, matching the
//! design's wire table.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::protocol_types::{Buffer, LengthPrefixType};
use crate::core::{error::{Result, VtmuxError},
                   pane::NodeId};

const TAG_HELLO: u8 = 0;
const TAG_SIZE: u8 = 1;
const TAG_INPUT: u8 = 2;
const TAG_ATTACH: u8 = 3;
const TAG_DETACH: u8 = 4;
const TAG_OUTPUT: u8 = 5;
const TAG_RESIZE: u8 = 6;
const TAG_ERROR: u8 = 7;

/// One message of the wire protocol. Client-to-server variants (`Hello`,
/// `Size`, `Input`, `Attach`, `Detach`) and server-to-client variants
/// (`Output`, `Resize`, `Error`) share one enum since both sides use the same
/// framing; which variants are legal in which direction is a protocol-level
/// rule enforced by the reader, not by the type.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Client capabilities and initial terminal size, sent once at
    /// connection start.
    Hello { term: String, cols: u16, rows: u16 },
    /// The client's terminal was resized.
    Size { cols: u16, rows: u16 },
    /// Bytes typed by the user, to be written to the attached pane.
    Input { bytes: Buffer },
    /// Attach to the pane named by `node_id`.
    Attach { node_id: NodeId },
    /// Detach from whatever pane is currently attached.
    Detach,
    /// A delta (or, after coalescing, a full resend) of the attached pane's
    /// screen.
    Output { bytes: Buffer },
    /// The server is forcing the client's pane to a new size.
    Resize { cols: u16, rows: u16 },
    /// A protocol- or application-level failure.
    Error { code: u16, message: String },
}

fn write_string(buffer: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    buffer.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buffer.extend_from_slice(bytes);
}

fn write_buffer(buffer: &mut Vec<u8>, value: &[u8]) {
    buffer.extend_from_slice(&(value.len() as u32).to_le_bytes());
    buffer.extend_from_slice(value);
}

fn encode(message: &Message) -> Vec<u8> {
    let mut body = Vec::new();
    match message {
        Message::Hello { term, cols, rows } => {
            body.push(TAG_HELLO);
            write_string(&mut body, term);
            body.extend_from_slice(&cols.to_le_bytes());
            body.extend_from_slice(&rows.to_le_bytes());
        }
        Message::Size { cols, rows } => {
            body.push(TAG_SIZE);
            body.extend_from_slice(&cols.to_le_bytes());
            body.extend_from_slice(&rows.to_le_bytes());
        }
        Message::Input { bytes } => {
            body.push(TAG_INPUT);
            write_buffer(&mut body, bytes);
        }
        Message::Attach { node_id } => {
            body.push(TAG_ATTACH);
            body.extend_from_slice(&node_id.get().to_le_bytes());
        }
        Message::Detach => body.push(TAG_DETACH),
        Message::Output { bytes } => {
            body.push(TAG_OUTPUT);
            write_buffer(&mut body, bytes);
        }
        Message::Resize { cols, rows } => {
            body.push(TAG_RESIZE);
            body.extend_from_slice(&cols.to_le_bytes());
            body.extend_from_slice(&rows.to_le_bytes());
        }
        Message::Error { code, message } => {
            body.push(TAG_ERROR);
            body.extend_from_slice(&code.to_le_bytes());
            write_string(&mut body, message);
        }
    }
    body
}

struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self { Self { bytes, position: 0 } }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position.checked_add(len).ok_or_else(|| VtmuxError::Parse("frame length overflow".to_string()))?;
        let slice = self.bytes.get(self.position..end).ok_or_else(|| VtmuxError::Parse("frame truncated".to_string()))?;
        self.position = end;
        Ok(slice)
    }

    fn take_u8(&mut self) -> Result<u8> { Ok(self.take(1)?[0]) }

    fn take_u16(&mut self) -> Result<u16> { Ok(u16::from_le_bytes(self.take(2)?.try_into().expect("length checked"))) }

    fn take_u32(&mut self) -> Result<u32> { Ok(u32::from_le_bytes(self.take(4)?.try_into().expect("length checked"))) }

    fn take_string(&mut self) -> Result<String> {
        let len = self.take_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|err| VtmuxError::Parse(format!("invalid UTF-8 in frame: {err}")))
    }

    fn take_buffer(&mut self) -> Result<Buffer> {
        let len = self.take_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

fn decode(body: &[u8]) -> Result<Message> {
    let mut cursor = Cursor::new(body);
    let tag = cursor.take_u8()?;
    let message = match tag {
        TAG_HELLO => {
            let term = cursor.take_string()?;
            let cols = cursor.take_u16()?;
            let rows = cursor.take_u16()?;
            Message::Hello { term, cols, rows }
        }
        TAG_SIZE => Message::Size { cols: cursor.take_u16()?, rows: cursor.take_u16()? },
        TAG_INPUT => Message::Input { bytes: cursor.take_buffer()? },
        TAG_ATTACH => Message::Attach { node_id: NodeId::from_raw(cursor.take_u32()?) },
        TAG_DETACH => Message::Detach,
        TAG_OUTPUT => Message::Output { bytes: cursor.take_buffer()? },
        TAG_RESIZE => Message::Resize { cols: cursor.take_u16()?, rows: cursor.take_u16()? },
        TAG_ERROR => {
            let code = cursor.take_u16()?;
            let message = cursor.take_string()?;
            Message::Error { code, message }
        }
        other => return Err(VtmuxError::Parse(format!("unknown frame tag {other}"))),
    };
    Ok(message)
}

/// Writes one frame: a `u64` little-endian length prefix followed by the
/// encoded message.
///
/// # Errors
/// Returns [`VtmuxError::Io`] if the underlying writer fails.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, message: &Message) -> Result<()> {
    let body = encode(message);
    let len = body.len() as LengthPrefixType;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame. Returns [`VtmuxError::Io`] with an empty-source `io::Error` (kind
/// `UnexpectedEof`) when the peer closes the connection cleanly before a new frame
/// starts.
///
/// # Errors
/// Returns [`VtmuxError::Io`] on a read failure or clean close, [`VtmuxError::Parse`] if
/// the frame is malformed or tagged unrecognisably.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Message> {
    let mut len_bytes = [0_u8; size_of::<LengthPrefixType>()];
    reader.read_exact(&mut len_bytes).await?;
    let len = LengthPrefixType::from_le_bytes(len_bytes) as usize;
    let mut body = vec![0_u8; len];
    reader.read_exact(&mut body).await?;
    decode(&body)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn roundtrip(message: Message) -> Message {
        let mut buffer = Vec::new();
        write_message(&mut buffer, &message).await.unwrap();
        let mut cursor = std::io::Cursor::new(buffer);
        read_message(&mut cursor).await.unwrap()
    }

    #[tokio::test]
    async fn hello_roundtrips() {
        let message = Message::Hello { term: "xterm-256color".to_string(), cols: 80, rows: 24 };
        assert_eq!(roundtrip(message.clone()).await, message);
    }

    #[tokio::test]
    async fn input_with_binary_payload_roundtrips() {
        let message = Message::Input { bytes: vec![0, 1, 2, 255, 254] };
        assert_eq!(roundtrip(message.clone()).await, message);
    }

    #[tokio::test]
    async fn attach_carries_the_node_id() {
        let message = Message::Attach { node_id: NodeId::from_raw(7) };
        assert_eq!(roundtrip(message.clone()).await, message);
    }

    #[tokio::test]
    async fn detach_has_no_payload() {
        assert_eq!(roundtrip(Message::Detach).await, Message::Detach);
    }

    #[tokio::test]
    async fn error_message_roundtrips() {
        let message = Message::Error { code: 2, message: "no such pane".to_string() };
        assert_eq!(roundtrip(message.clone()).await, message);
    }

    #[tokio::test]
    async fn truncated_frame_is_an_io_error() {
        let mut buffer = Vec::new();
        write_message(&mut buffer, &Message::Input { bytes: vec![1, 2, 3] }).await.unwrap();
        buffer.truncate(buffer.len() - 1);
        let mut cursor = std::io::Cursor::new(buffer);
        assert!(matches!(read_message(&mut cursor).await, Err(VtmuxError::Io(_))));
    }

    #[tokio::test]
    async fn unknown_tag_is_a_parse_error() {
        let mut body = Vec::new();
        body.push(99_u8);
        let err = decode(&body).unwrap_err();
        assert!(matches!(err, VtmuxError::Parse(_)));
    }
}
