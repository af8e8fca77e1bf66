// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Bidirectional PTY communication implementation.
//!
//! This module provides the internal implementation for
//! `PtyCommandBuilder::spawn_read_write()`, which enables both reading from and writing
//! to a child process running in a pseudo-terminal.
//!
//! # Core Architecture
//!
//! - **Shared functionality**: uses `common_impl.rs` for PTY setup, reader/writer tasks
//! - **Session management**: [`PtyReadWriteSession`] provides channels for bidirectional
//!   communication
//! - **Type system**: [`PtyInputEvent`] for sending commands, [`ControlChar`] for
//!   special keys, [`PtyOutputEvent`] for output
//!
//! # Design Decisions
//!
//! ## Dumb Pipes Approach
//! The API treats input and output channels as dumb pipes of events, making no
//! assumptions about the child process. The child determines terminal modes (cooked/raw),
//! interprets environment variables, and handles all terminal-specific behavior.
//!
//! ## Single Input Handler Architecture
//! A single task owns the [`portable_pty::MasterPty`] and handles all input operations
//! including resize, avoiding synchronization between a writer and a resizer.
//!
//! ## Task Separation
//! - **Reader task**: independently reads from PTY, processes OSC sequences, sends events
//! - **Input handler task**: owns the `MasterPty`, processes all input commands
//! - **Bridge task**: converts the async input channel into the sync channel the blocking
//!   input handler reads from

use miette::IntoDiagnostic;
use tokio::sync::mpsc::unbounded_channel;

use super::pty_command_builder::PtyCommandBuilder;
use super::pty_config::PtyConfig;
use super::pty_core::{PtyInputEvent, PtyOutputEvent, PtyReadWriteSession};
use super::common_impl::{create_input_handler_task, create_pty_pair,
                         spawn_blocking_controller_reader_task, spawn_command_in_pty};

impl PtyCommandBuilder {
    /// Spawns a bidirectional PTY session; symmetric to
    /// [`super::pty_read_only::PtyCommandBuilder::spawn_read_only`] but also hands back
    /// an input sender so the caller can write to the child's stdin and resize the PTY.
    ///
    /// # Errors
    /// Returns an error if the command fails to build or the PTY fails to open.
    pub fn spawn_read_write(
        self,
        config: impl Into<PtyConfig>,
    ) -> miette::Result<PtyReadWriteSession> {
        spawn_pty_read_write_impl(self, config)
    }
}

/// Internal implementation for spawning a read-write PTY session.
///
/// This is called by `PtyCommandBuilder::spawn_read_write()`.
///
/// # Errors
/// Returns an error if the command fails to build or the PTY fails to open.
pub(crate) fn spawn_pty_read_write_impl(
    command: PtyCommandBuilder,
    config: impl Into<PtyConfig>,
) -> miette::Result<PtyReadWriteSession> {
    let config = config.into();

    let (output_event_sender_half, output_event_receiver_half) = unbounded_channel();
    let (input_event_sender_half, input_event_receiver_half) =
        unbounded_channel::<PtyInputEvent>();

    // The blocking input handler task needs a std::sync::mpsc::Receiver, so bridge the
    // async sender side onto a sync channel it can poll with a timeout.
    let (bridge_sender, bridge_receiver) = std::sync::mpsc::channel::<PtyInputEvent>();

    let reader_event_sender = output_event_sender_half.clone();
    let input_handler_event_sender = output_event_sender_half.clone();

    let completion_handle = Box::pin(tokio::spawn(async move {
        let built_command = command.build()?;

        let (controller, controlled) = create_pty_pair(&config)?;

        let mut controlled_child = spawn_command_in_pty(&controlled, built_command)?;

        let controller_reader = controller
            .try_clone_reader()
            .map_err(|e| miette::miette!("Failed to clone pty reader: {}", e))?;
        let reader_handle = spawn_blocking_controller_reader_task(
            controller_reader,
            reader_event_sender,
            config,
        );

        let input_handler_handle =
            create_input_handler_task(controller, bridge_receiver, input_handler_event_sender);

        let bridge_handle = tokio::spawn(async move {
            let mut receiver = input_event_receiver_half;
            while let Some(input) = receiver.recv().await {
                if bridge_sender.send(input).is_err() {
                    break;
                }
            }
            let _unused = bridge_sender.send(PtyInputEvent::Close);
        });

        let status = tokio::task::spawn_blocking(move || controlled_child.wait())
            .await
            .into_diagnostic()?
            .into_diagnostic()?;

        let exit_code = status.exit_code();
        let _unused = output_event_sender_half.send(PtyOutputEvent::Exit(status));

        drop(controlled);

        let _unused = bridge_handle.await;
        let _unused = input_handler_handle.await;
        let _unused = reader_handle.await;

        Ok(portable_pty::ExitStatus::with_exit_code(exit_code))
    }));

    Ok(PtyReadWriteSession {
        input_event_sender_half,
        output_event_receiver_half,
        completion_handle,
    })
}

#[cfg(test)]
mod tests {
    use super::super::pty_core::PtyOutputEvent;
    use crate::core::pty::{PtyCommandBuilder, PtyConfigOption, pty_core::PtyInputEvent};

    #[tokio::test]
    async fn test_echo_command() {
        let mut session = PtyCommandBuilder::new("echo")
            .args(["Hello, PTY!"])
            .spawn_read_write(PtyConfigOption::Output)
            .unwrap();

        let mut output = String::new();
        while let Some(event) = session.output_event_receiver_half.recv().await {
            match event {
                PtyOutputEvent::Output(data) => {
                    output.push_str(&String::from_utf8_lossy(&data));
                }
                PtyOutputEvent::Exit(status) => {
                    assert!(status.success());
                    break;
                }
                _ => {}
            }
        }

        assert!(output.contains("Hello, PTY!"));
    }

    #[tokio::test]
    async fn test_cat_with_input() {
        let mut session = PtyCommandBuilder::new("cat")
            .spawn_read_write(PtyConfigOption::Output)
            .unwrap();

        session
            .input_event_sender_half
            .send(PtyInputEvent::WriteLine("test input".into()))
            .unwrap();
        session
            .input_event_sender_half
            .send(PtyInputEvent::SendControl(
                crate::core::pty::pty_core::ControlChar::CtrlD,
            ))
            .unwrap();

        let mut output = String::new();
        while let Some(event) = session.output_event_receiver_half.recv().await {
            match event {
                PtyOutputEvent::Output(data) => {
                    output.push_str(&String::from_utf8_lossy(&data));
                }
                PtyOutputEvent::Exit(_) => break,
                _ => {}
            }
        }

        assert!(output.contains("test input"));
    }
}
