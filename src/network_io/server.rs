// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The daemon side of the wire protocol: accepts client connections on a
//! unix-domain socket and multiplexes them onto the shared [`Tree`].
//!
//! Per §5's scheduling model, each client gets its own reader task and its
//! own writer task, joined by an internal `mpsc` channel. Mirroring a pane's
//! output onto an attached client happens exactly once, in the writer task's
//! coalescing loop — never at the point bytes are read off the PTY — so a
//! pane with several attached clients has one mirroring site per client, not
//! one per byte read.

use std::{collections::HashMap,
          path::{Path, PathBuf},
          sync::{atomic::{AtomicU64, Ordering},
                 Arc},
          time::Duration};

use tokio::{net::{UnixListener, UnixStream},
            sync::{mpsc, RwLock},
            time::MissedTickBehavior};

use super::wire::{self, Message};
use crate::core::{emulator::ScreenSnapshot,
                   error::{Result, VtmuxError},
                   pane::{NodeId, Pane, PaneUpdate, Tree},
                   publisher::Subscription,
                   script::{Registry, Value}};

/// Per-client attachment state shared between a client's reader task (which
/// updates it on `Attach`/`Detach`) and the `pane/current` script callback
/// (which only ever reads it). Keyed by the connection-local client id
/// assigned in [`Server::run`], not by [`NodeId`].
type Attachments = Arc<RwLock<HashMap<u64, NodeId>>>;

/// Write timeout for any single frame (§4.5).
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);
/// How long a client has to send `Hello` before being disconnected (§6).
const HELLO_TIMEOUT: Duration = Duration::from_secs(5);
/// Coalescing tick for the per-client output writer (§4.5).
const COALESCE_TICK: Duration = Duration::from_millis(16);

/// Internal instruction from a client's reader task to its writer task.
/// Never serialized; this is purely in-process plumbing, distinct from
/// [`Message`].
enum WriterCommand {
    Attach(NodeId),
    Detach,
    Resize { cols: u16, rows: u16 },
    Error { code: u16, message: String },
}

/// Renders a screen snapshot as a plain byte stream (clear, home, then each
/// row's characters) for the "keep latest full state resend" backpressure
/// path. This intentionally drops color/attribute state — it exists only to
/// resynchronise a client that fell behind, not to replace normal delta
/// streaming.
fn render_snapshot(snapshot: &ScreenSnapshot) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"\x1b[2J\x1b[H");
    for (row_index, row) in snapshot.grid.iter().enumerate() {
        if row_index > 0 {
            bytes.extend_from_slice(b"\r\n");
        }
        let mut char_buffer = [0_u8; 4];
        for glyph in row {
            bytes.extend_from_slice(glyph.ch.encode_utf8(&mut char_buffer).as_bytes());
        }
    }
    bytes
}

async fn send_with_timeout<W: tokio::io::AsyncWrite + Unpin>(writer: &mut W, message: &Message) -> Result<()> {
    tokio::time::timeout(WRITE_TIMEOUT, wire::write_message(writer, message))
        .await
        .map_err(|_| VtmuxError::Timeout("write did not complete within 1s".to_string()))?
}

async fn current_screen_bytes(tree: &RwLock<Tree>, id: NodeId) -> Option<Vec<u8>> {
    let guard = tree.read().await;
    let pane = guard.pane(id)?;
    Some(render_snapshot(&pane.screen().await))
}

/// Drives frames out to the client: forwards [`WriterCommand`]s immediately
/// (resizes, errors), and coalesces pane output on a fixed tick, falling back
/// to a full-screen resend if the client can't keep up with deltas.
async fn run_writer<W: tokio::io::AsyncWrite + Unpin>(mut socket: W, mut commands: mpsc::Receiver<WriterCommand>, tree: Arc<RwLock<Tree>>) -> Result<()> {
    let mut updates: Option<Subscription<PaneUpdate>> = None;
    let mut attached: Option<NodeId> = None;
    let mut pending: Vec<u8> = Vec::new();

    let mut ticker = tokio::time::interval(COALESCE_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                match command {
                    WriterCommand::Attach(id) => {
                        attached = Some(id);
                        pending.clear();
                        updates = tree.read().await.pane(id).map(Pane::updates);
                        if let Some(bytes) = current_screen_bytes(&tree, id).await {
                            send_with_timeout(&mut socket, &Message::Output { bytes }).await?;
                        }
                    }
                    WriterCommand::Detach => {
                        attached = None;
                        updates = None;
                        pending.clear();
                    }
                    WriterCommand::Resize { cols, rows } => {
                        send_with_timeout(&mut socket, &Message::Resize { cols, rows }).await?;
                    }
                    WriterCommand::Error { code, message } => {
                        send_with_timeout(&mut socket, &Message::Error { code, message }).await?;
                    }
                }
            }
            update = recv_update(&mut updates) => {
                if let Some(update) = update {
                    pending.extend_from_slice(&update.bytes);
                }
            }
            _ = ticker.tick() => {
                if pending.is_empty() {
                    continue;
                }
                let bytes = std::mem::take(&mut pending);
                if send_with_timeout(&mut socket, &Message::Output { bytes }).await.is_err() {
                    if let Some(id) = attached {
                        if let Some(bytes) = current_screen_bytes(&tree, id).await {
                            let _ = send_with_timeout(&mut socket, &Message::Output { bytes }).await;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Awaits the next update from `updates` if attached, or never resolves if not —
/// letting [`tokio::select!`] treat "not attached" the same as "nothing ready yet."
async fn recv_update(updates: &mut Option<Subscription<PaneUpdate>>) -> Option<PaneUpdate> {
    match updates {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

/// Reads client-to-server messages and turns them into [`Tree`] operations or
/// [`WriterCommand`]s. Enforces the `Hello`-within-5s rule (§6). Keeps
/// `attachments` in sync with the locally tracked `attached` pane so
/// `pane/current(Context { client_id })` resolves to the same node this
/// reader is forwarding input to.
async fn run_reader<R: tokio::io::AsyncRead + Unpin>(
    mut socket: R,
    writer_tx: mpsc::Sender<WriterCommand>,
    tree: Arc<RwLock<Tree>>,
    client_id: u64,
    attachments: Attachments,
) -> Result<()> {
    let hello = tokio::time::timeout(HELLO_TIMEOUT, wire::read_message(&mut socket))
        .await
        .map_err(|_| VtmuxError::Timeout("no Hello within 5s".to_string()))??;
    let Message::Hello { .. } = hello else {
        return Err(VtmuxError::Parse("expected Hello as the first frame".to_string()));
    };

    let mut attached: Option<NodeId> = None;
    loop {
        let message = match wire::read_message(&mut socket).await {
            Ok(message) => message,
            Err(VtmuxError::Io(_)) => return Ok(()),
            Err(err) => return Err(err),
        };
        match message {
            Message::Attach { node_id } => {
                if tree.read().await.pane(node_id).is_some() {
                    attached = Some(node_id);
                    attachments.write().await.insert(client_id, node_id);
                    let _unused = writer_tx.send(WriterCommand::Attach(node_id)).await;
                } else {
                    let _unused = writer_tx
                        .send(WriterCommand::Error { code: 1, message: format!("no such pane {node_id}") })
                        .await;
                }
            }
            Message::Detach => {
                attached = None;
                attachments.write().await.remove(&client_id);
                let _unused = writer_tx.send(WriterCommand::Detach).await;
            }
            Message::Input { bytes } => {
                if let Some(id) = attached {
                    if let Some(pane) = tree.read().await.pane(id) {
                        let _unused = pane.write(bytes).await;
                    }
                }
            }
            Message::Size { cols, rows } => {
                if let Some(id) = attached {
                    if let Some(pane) = tree.read().await.pane(id) {
                        let _unused = pane.resize(cols, rows).await;
                        let _unused = writer_tx.send(WriterCommand::Resize { cols, rows }).await;
                    }
                }
            }
            Message::Hello { .. } | Message::Output { .. } | Message::Resize { .. } | Message::Error { .. } => {
                let _unused = writer_tx.send(WriterCommand::Error { code: 2, message: "unexpected server-bound frame".to_string() }).await;
            }
        }
    }
}

async fn handle_client(stream: UnixStream, client_id: u64, tree: Arc<RwLock<Tree>>, attachments: Attachments) -> Result<()> {
    let (read_half, write_half) = stream.into_split();
    let (tx, rx) = mpsc::channel(64);
    let writer_tree = Arc::clone(&tree);
    let writer_handle = tokio::spawn(async move { run_writer(write_half, rx, writer_tree).await });
    let reader_result = run_reader(read_half, tx, tree, client_id, Arc::clone(&attachments)).await;
    attachments.write().await.remove(&client_id);
    writer_handle.abort();
    reader_result
}

/// Registers the minimal script callbacks named in §4.7 against `registry`:
/// `log`, `key/bind`, and `pane/current`. The embedded interpreter that
/// invokes them is out of scope for this crate, but the server-side bindings
/// these names resolve to are not.
fn register_callbacks(registry: &Registry, tree: Arc<RwLock<Tree>>, attachments: Attachments) {
    registry.register("log", Arc::new(|args: &[Value]| {
        let text = args.first().and_then(Value::as_str).unwrap_or_default();
        tracing::info!(target: "vtmux::script", "{text}");
        Ok(Value::Unit)
    }));

    registry.register("key/bind", Arc::new(move |args: &[Value]| {
        let node_id = args.first().and_then(Value::as_node_id).ok_or_else(|| VtmuxError::Invalid("key/bind expects a node id as its first argument".to_string()))?;
        let sequence = args
            .get(1)
            .and_then(Value::as_list)
            .ok_or_else(|| VtmuxError::Invalid("key/bind expects a key sequence as its second argument".to_string()))?;
        let doc = args.get(2).and_then(Value::as_str).unwrap_or_default();
        let callback = args
            .get(3)
            .and_then(Value::as_str)
            .ok_or_else(|| VtmuxError::Invalid("key/bind expects a callback name as its fourth argument".to_string()))?;
        // Only ever called off the tokio runtime thread: the embedded
        // interpreter sits outside the async machinery this crate owns.
        tree.blocking_write().bind(node_id, sequence, doc, callback)?;
        Ok(Value::Unit)
    }));

    registry.register("pane/current", Arc::new(move |args: &[Value]| {
        let context = args
            .first()
            .and_then(Value::as_context)
            .ok_or_else(|| VtmuxError::Invalid("pane/current expects a context as its only argument".to_string()))?;
        attachments
            .blocking_read()
            .get(&context.client_id)
            .copied()
            .map(Value::NodeId)
            .ok_or_else(|| VtmuxError::NotFound(format!("client {} is not attached to a pane", context.client_id)))
    }));
}

/// The daemon: owns the shared [`Tree`] and accepts client connections on a
/// unix-domain socket.
pub struct Server {
    tree: Arc<RwLock<Tree>>,
    registry: Arc<Registry>,
    attachments: Attachments,
    next_client_id: AtomicU64,
    socket_path: PathBuf,
}

impl Server {
    #[must_use]
    pub fn new(socket_path: impl Into<PathBuf>, scrollback_capacity: usize) -> Self {
        let tree = Arc::new(RwLock::new(Tree::new(scrollback_capacity)));
        let attachments: Attachments = Arc::new(RwLock::new(HashMap::new()));
        let registry = Arc::new(Registry::new());
        register_callbacks(&registry, Arc::clone(&tree), Arc::clone(&attachments));
        Self { tree, registry, attachments, next_client_id: AtomicU64::new(0), socket_path: socket_path.into() }
    }

    #[must_use]
    pub fn tree(&self) -> Arc<RwLock<Tree>> { Arc::clone(&self.tree) }

    /// The script callback table, pre-populated with `log`, `key/bind`, and
    /// `pane/current` (§4.7). An embedding interpreter invokes these by name;
    /// this crate never evaluates a script itself.
    #[must_use]
    pub fn registry(&self) -> Arc<Registry> { Arc::clone(&self.registry) }

    /// Binds the socket (creating its parent directory and removing any stale
    /// socket file first) with mode 0700, then accepts connections forever,
    /// spawning one task pair per client.
    ///
    /// # Errors
    /// Returns [`VtmuxError::Io`] if the socket cannot be bound.
    pub async fn run(self) -> Result<()> {
        bind_socket(&self.socket_path).await?;
        let listener = UnixListener::bind(&self.socket_path)?;
        restrict_socket_permissions(&self.socket_path)?;
        loop {
            let (stream, _addr) = listener.accept().await?;
            let client_id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
            let tree = Arc::clone(&self.tree);
            let attachments = Arc::clone(&self.attachments);
            tokio::spawn(async move {
                if let Err(err) = handle_client(stream, client_id, tree, attachments).await {
                    tracing::warn!(error = %err, client_id, "client session ended with an error");
                }
            });
        }
    }
}

async fn bind_socket(socket_path: &Path) -> Result<()> {
    if let Some(parent) = socket_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let _unused = tokio::fs::remove_file(socket_path).await;
    Ok(())
}

/// Restricts the just-created socket file to owner-only access (§6). `UnixListener::bind`
/// creates the file before we can set its mode, so this always runs as a second step
/// immediately after binding, not atomically with creation.
#[cfg(unix)]
fn restrict_socket_permissions(socket_path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_socket_permissions(_socket_path: &Path) -> Result<()> { Ok(()) }

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use pretty_assertions::assert_eq;
    use portable_pty::PtySize;
    use tempfile::tempdir;

    use super::*;
    use crate::core::{pty::{PtyCommandBuilder, PtyConfig, PtyConfigOption},
                       script::Context};

    #[tokio::test]
    async fn run_creates_a_socket_with_owner_only_permissions() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("nested").join("default.sock");
        let server = Server::new(socket_path.clone(), 100);

        let handle = tokio::spawn(server.run());
        for _ in 0..50 {
            if socket_path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let metadata = std::fs::metadata(&socket_path).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o700);
        handle.abort();
    }

    #[tokio::test]
    async fn hello_then_attach_streams_the_initial_screen() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("default.sock");
        let server = Server::new(socket_path.clone(), 100);
        let tree = server.tree();
        let config: PtyConfig = PtyConfigOption::Size(PtySize { rows: 5, cols: 20, pixel_width: 0, pixel_height: 0 }).into();
        let pane_id = {
            let mut guard = tree.write().await;
            let root = guard.root();
            guard.new_pane(root, PtyCommandBuilder::new("cat"), config).unwrap()
        };

        let server_handle = tokio::spawn(server.run());
        let mut stream = loop {
            match UnixStream::connect(&socket_path).await {
                Ok(stream) => break stream,
                Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        };

        wire::write_message(&mut stream, &Message::Hello { term: "xterm-256color".to_string(), cols: 20, rows: 5 }).await.unwrap();
        wire::write_message(&mut stream, &Message::Attach { node_id: pane_id }).await.unwrap();

        let reply = tokio::time::timeout(Duration::from_secs(2), wire::read_message(&mut stream)).await.unwrap().unwrap();
        assert!(matches!(reply, Message::Output { .. }));

        server_handle.abort();
    }

    #[test]
    fn log_callback_accepts_a_string_and_returns_unit() {
        let server = Server::new("/tmp/unused-vtmux-test.sock", 100);
        assert_eq!(server.registry().invoke("log", &[Value::String("hello".to_string())]).unwrap(), Value::Unit);
    }

    #[test]
    fn pane_current_resolves_the_attached_node_for_a_known_client() {
        let server = Server::new("/tmp/unused-vtmux-test.sock", 100);
        server.attachments.blocking_write().insert(7, NodeId::from_raw(42));

        let resolved = server.registry().invoke("pane/current", &[Value::Context(Context::new(7))]).unwrap();
        assert_eq!(resolved, Value::NodeId(NodeId::from_raw(42)));
    }

    #[test]
    fn pane_current_is_not_found_for_a_client_with_nothing_attached() {
        let server = Server::new("/tmp/unused-vtmux-test.sock", 100);
        let err = server.registry().invoke("pane/current", &[Value::Context(Context::new(99))]).unwrap_err();
        assert!(matches!(err, VtmuxError::NotFound(_)));
    }

    #[tokio::test]
    async fn key_bind_registers_a_real_binding_on_the_tree() {
        let server = Server::new("/tmp/unused-vtmux-test.sock", 100);
        let tree = server.tree();
        let root = tree.read().await.root();

        let args = [Value::NodeId(root.id()), Value::List(vec!["Ctrl-b".to_string(), "c".to_string()]), Value::String("new pane".to_string()), Value::String("pane/new".to_string())];
        server.registry().invoke("key/bind", &args).unwrap();

        let binding = tree.read().await.lookup_binding(root.id(), &["Ctrl-b".to_string(), "c".to_string()]).unwrap().clone();
        assert_eq!(binding.callback, "pane/new");
    }
}
