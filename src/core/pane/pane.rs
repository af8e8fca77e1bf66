// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! One child PTY bound to one [`Emulator`] and one [`Recorder`].

use std::sync::Arc;

use portable_pty::PtySize;
use tokio::{sync::{mpsc::UnboundedSender, Mutex, RwLock},
            task::JoinHandle};

use crate::core::{emulator::{Emulator, ScreenSnapshot},
                   error::{Result, VtmuxError},
                   event_log::{Event, Recorder},
                   publisher::{Publisher, Subscription},
                   pty::{PtyCommandBuilder, PtyConfig, PtyInputEvent, PtyOutputEvent, PtyReadWriteSession}};

use super::node_id::NodeId;

/// A change fanned out to a pane's subscribers: the bytes most recently
/// written by the child process, already applied to the emulator and
/// appended to the recorder before this is published — the ordering the
/// concurrency model requires (§5): a subscriber never observes an output
/// byte before the emulator reflects it.
#[derive(Debug, Clone)]
pub struct PaneUpdate {
    pub bytes: Vec<u8>,
}

/// One PTY child process, bound to one [`Emulator`] that mirrors its screen
/// and one [`Recorder`] that logs every byte it produces or is sent. Owned by
/// a [`super::Tree`] node; dropping a `Pane` tears down its reader task (and,
/// transitively, its PTY).
pub struct Pane {
    id: NodeId,
    emulator: Arc<RwLock<Emulator>>,
    recorder: Arc<Mutex<Recorder>>,
    input: UnboundedSender<PtyInputEvent>,
    updates: Publisher<PaneUpdate>,
    reader_task: JoinHandle<()>,
}

impl Pane {
    /// Spawns `command` in a PTY sized per `config`, and starts the
    /// background task that drives the emulator/recorder/publisher chain
    /// from its output.
    ///
    /// # Errors
    /// Returns [`VtmuxError::Io`] if the PTY or the child process fails to
    /// spawn.
    pub fn spawn(id: NodeId, command: PtyCommandBuilder, config: PtyConfig, scrollback_capacity: usize) -> Result<Self> {
        let size = config.get_pty_size();
        let (cols, rows) = (size.cols as usize, size.rows as usize);

        let PtyReadWriteSession { input_event_sender_half, mut output_event_receiver_half, completion_handle } =
            command.spawn_read_write(config).map_err(|err| VtmuxError::Io(err.to_string()))?;

        let emulator = Arc::new(RwLock::new(Emulator::with_scrollback_capacity(cols, rows, scrollback_capacity)));
        let recorder = Arc::new(Mutex::new(Recorder::new()));
        let updates: Publisher<PaneUpdate> = Publisher::new();

        let task_emulator = Arc::clone(&emulator);
        let task_recorder = Arc::clone(&recorder);
        let task_updates = updates.clone();
        let reader_task = tokio::spawn(async move {
            // Keeps the child's completion future alive for the pane's
            // lifetime; the PTY is torn down when this task (and the handle
            // it owns) is dropped.
            let _completion = completion_handle;
            while let Some(event) = output_event_receiver_half.recv().await {
                match event {
                    PtyOutputEvent::Output(bytes) => {
                        task_emulator.write().await.write(&bytes);
                        task_recorder.lock().await.append_output(bytes.clone());
                        task_updates.publish(PaneUpdate { bytes });
                    }
                    PtyOutputEvent::Exit(_) | PtyOutputEvent::UnexpectedExit(_) | PtyOutputEvent::WriteError(_) => break,
                    PtyOutputEvent::Osc(_) => {}
                }
            }
        });

        Ok(Self { id, emulator, recorder, input: input_event_sender_half, updates, reader_task })
    }

    #[must_use]
    pub fn id(&self) -> NodeId { self.id }

    /// Writes `bytes` to the child's stdin, recording them as an `Input`
    /// event first. Input events are logged for a faithful record but are
    /// never replayed into a live PTY.
    ///
    /// # Errors
    /// Returns [`VtmuxError::Invalid`] if the PTY writer has already closed.
    pub async fn write(&self, bytes: Vec<u8>) -> Result<()> {
        self.recorder.lock().await.append_input(bytes.clone());
        self.input
            .send(PtyInputEvent::Write(bytes))
            .map_err(|_err| VtmuxError::Invalid("pane PTY writer closed".to_string()))
    }

    /// Resizes both the emulator and the underlying PTY, recording a
    /// `Resize` event.
    ///
    /// # Errors
    /// Returns [`VtmuxError::Invalid`] if the PTY writer has already closed.
    pub async fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        self.emulator.write().await.resize(cols as usize, rows as usize);
        self.recorder.lock().await.append_resize(cols, rows);
        self.input
            .send(PtyInputEvent::Resize(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 }))
            .map_err(|_err| VtmuxError::Invalid("pane PTY writer closed".to_string()))
    }

    #[must_use]
    pub async fn screen(&self) -> ScreenSnapshot { self.emulator.read().await.screen() }

    /// Subscribes to this pane's output updates. See [`PaneUpdate`].
    #[must_use]
    pub fn updates(&self) -> Subscription<PaneUpdate> { self.updates.subscribe() }

    /// A snapshot of every event recorded for this pane so far, suitable for
    /// handing to [`crate::core::replay::ReplayEngine::new`] or
    /// [`crate::core::event_log::save`].
    #[must_use]
    pub async fn events_snapshot(&self) -> Vec<Event> { self.recorder.lock().await.snapshot().to_vec() }
}

impl Drop for Pane {
    fn drop(&mut self) { self.reader_task.abort(); }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::pty::{PtyCommandBuilder, PtyConfigOption};

    fn allocate() -> NodeId { super::super::node_id::NodeIdAllocator::new().allocate() }

    #[tokio::test]
    async fn write_is_mirrored_into_emulator_and_recorder() {
        let config: PtyConfig = PtyConfigOption::Size(PtySize { rows: 5, cols: 20, pixel_width: 0, pixel_height: 0 }).into();
        let pane = Pane::spawn(allocate(), PtyCommandBuilder::new("cat"), config, 100).expect("spawn cat");

        pane.write(b"hi\n".to_vec()).await.expect("write");
        // Give the PTY reader task a moment to mirror `cat`'s echo back in.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let events = pane.events_snapshot().await;
        assert!(events.iter().any(|event| matches!(&event.kind, crate::core::event_log::EventKind::Input(bytes) if bytes == b"hi\n")));
    }

    #[tokio::test]
    async fn resize_updates_emulator_dimensions() {
        let config: PtyConfig = PtyConfigOption::Size(PtySize { rows: 5, cols: 20, pixel_width: 0, pixel_height: 0 }).into();
        let pane = Pane::spawn(allocate(), PtyCommandBuilder::new("cat"), config, 100).expect("spawn cat");

        pane.resize(30, 10).await.expect("resize");
        let screen = pane.screen().await;
        assert_eq!((screen.cols, screen.rows), (30, 10));
    }
}
