// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The `attach` side of the transport: connects to the daemon's socket,
//! sends `Hello`/`Attach`, and forwards the local terminal's stdin/stdout
//! to/from the attached pane.
//!
//! Per §5's resource-lifetime guarantee, `Detach` is sent on every exit path
//! out of [`AttachClient::run`] — clean EOF, a server-side close, or a
//! transport error — not only on the happy path.

use std::path::PathBuf;

use tokio::{io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
            net::UnixStream};

use super::wire::{self, Message};
use crate::core::{ansi::RawModeGuard,
                   config::DEFAULT_TERM,
                   error::{Result, VtmuxError},
                   pane::NodeId};

/// Forwards a local terminal to a pane attached over a unix-domain socket.
pub struct AttachClient {
    socket_path: PathBuf,
    node_id: NodeId,
    term: String,
}

impl AttachClient {
    #[must_use]
    pub fn new(socket_path: impl Into<PathBuf>, node_id: NodeId) -> Self {
        Self { socket_path: socket_path.into(), node_id, term: DEFAULT_TERM.to_string() }
    }

    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    /// Connects, completes the `Hello`/`Attach` handshake, then forwards
    /// stdin/stdout until the session ends.
    ///
    /// # Errors
    /// Returns [`VtmuxError::Io`] if the socket can't be reached, or whatever
    /// the session loop surfaces (see [`run_session`]).
    pub async fn run(self) -> Result<()> {
        let mut stream = UnixStream::connect(&self.socket_path).await?;
        let (cols, rows) = terminal_size();
        wire::write_message(&mut stream, &Message::Hello { term: self.term.clone(), cols, rows }).await?;
        wire::write_message(&mut stream, &Message::Attach { node_id: self.node_id }).await?;

        let guard = RawModeGuard::new().map_err(|err| VtmuxError::Io(err.to_string()))?;
        let (mut read_half, mut write_half) = stream.into_split();
        let result = run_session(&mut read_half, &mut write_half, &mut tokio::io::stdin(), &mut tokio::io::stdout(), terminal_size).await;

        // Guaranteed regardless of how the session loop above returned.
        let _unused = wire::write_message(&mut write_half, &Message::Detach).await;
        drop(guard);
        result
    }
}

/// Returns the local terminal's current size, falling back to 80x24 when it
/// can't be determined (e.g. stdout isn't a tty).
fn terminal_size() -> (u16, u16) { crossterm::terminal::size().unwrap_or((80, 24)) }

/// Drives one attach session: reads frames from `server_in` and writes
/// `Output` payloads to `stdout`, while relaying `stdin` bytes to
/// `server_out` as `Input` frames and size changes (as reported by
/// `current_size`) as `Size` frames.
///
/// Returns once the server closes the connection or `stdin` hits EOF.
async fn run_session<R, W, I, O>(server_in: &mut R, server_out: &mut W, stdin: &mut I, stdout: &mut O, current_size: fn() -> (u16, u16)) -> Result<()>
where R: AsyncRead + Unpin,
      W: AsyncWrite + Unpin,
      I: AsyncRead + Unpin,
      O: AsyncWrite + Unpin,
{
    let mut input_buffer = [0_u8; 4096];
    let mut last_size = current_size();

    loop {
        tokio::select! {
            message = wire::read_message(server_in) => {
                match message {
                    Ok(Message::Output { bytes }) => {
                        stdout.write_all(&bytes).await?;
                        stdout.flush().await?;
                    }
                    Ok(Message::Resize { .. }) => {
                        // The server is informing us it forced the pane to a
                        // new size; nothing to act on locally.
                    }
                    Ok(Message::Error { code, message }) => {
                        return Err(VtmuxError::Invalid(format!("server error {code}: {message}")));
                    }
                    Ok(Message::Hello { .. } | Message::Size { .. } | Message::Input { .. } | Message::Attach { .. } | Message::Detach) => {
                        return Err(VtmuxError::Parse("unexpected client-bound frame".to_string()));
                    }
                    Err(VtmuxError::Io(_)) => return Ok(()),
                    Err(err) => return Err(err),
                }
            }
            read = stdin.read(&mut input_buffer) => {
                let read_count = read?;
                if read_count == 0 {
                    return Ok(());
                }
                wire::write_message(server_out, &Message::Input { bytes: input_buffer[..read_count].to_vec() }).await?;

                let size_now = current_size();
                if size_now != last_size {
                    last_size = size_now;
                    wire::write_message(server_out, &Message::Size { cols: size_now.0, rows: size_now.1 }).await?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn fixed_size() -> (u16, u16) { (80, 24) }

    #[tokio::test]
    async fn output_frame_is_written_to_stdout() {
        let (mut server_side, mut client_side) = tokio::io::duplex(4096);
        wire::write_message(&mut server_side, &Message::Output { bytes: b"hello".to_vec() }).await.unwrap();
        drop(server_side);

        // Never written to or dropped within the test, so `stdin_read` stays
        // pending for the whole run — the Output branch is the only one ready.
        let (_stdin_write, mut stdin_read) = tokio::io::duplex(64);
        let mut stdout = Vec::new();
        let result = run_session(&mut client_side, &mut Vec::new(), &mut stdin_read, &mut stdout, fixed_size).await;

        assert!(result.is_ok());
        assert_eq!(stdout, b"hello");
    }

    #[tokio::test]
    async fn stdin_bytes_are_forwarded_as_input_frames() {
        let (server_side, mut client_side) = tokio::io::duplex(4096);
        let (mut server_read, _server_write) = tokio::io::split(server_side);

        let (mut stdin_write, mut stdin_read) = tokio::io::duplex(64);
        stdin_write.write_all(b"ls\n").await.unwrap();

        // Never written to within the test, so this stays pending — only the
        // stdin branch is ready, avoiding a race against a second instantly-EOF
        // source on the server_in side.
        let (_server_in_write, mut sink_in) = tokio::io::duplex(64);

        let session = tokio::spawn(async move {
            let mut stdout = Vec::new();
            run_session(&mut sink_in, &mut client_side, &mut stdin_read, &mut stdout, fixed_size).await
        });

        let frame = tokio::time::timeout(std::time::Duration::from_secs(1), wire::read_message(&mut server_read)).await.unwrap().unwrap();
        assert_eq!(frame, Message::Input { bytes: b"ls\n".to_vec() });
        drop(stdin_write);
        session.abort();
    }

    #[tokio::test]
    async fn error_frame_ends_the_session_with_invalid() {
        let (mut server_side, mut client_side) = tokio::io::duplex(4096);
        wire::write_message(&mut server_side, &Message::Error { code: 1, message: "no such pane".to_string() }).await.unwrap();
        drop(server_side);

        let (_stdin_write, mut stdin_read) = tokio::io::duplex(64);
        let mut stdout = Vec::new();
        let result = run_session(&mut client_side, &mut Vec::new(), &mut stdin_read, &mut stdout, fixed_size).await;
        assert!(matches!(result, Err(VtmuxError::Invalid(_))));
    }

    #[tokio::test]
    async fn stdin_eof_ends_the_session_cleanly() {
        let (_server_side, mut client_side) = tokio::io::duplex(4096);
        let mut stdin = tokio::io::empty();
        let mut stdout = Vec::new();
        let result = run_session(&mut client_side, &mut Vec::new(), &mut stdin, &mut stdout, fixed_size).await;
        assert!(result.is_ok());
    }
}
