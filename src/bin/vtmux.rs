/*
 *   Copyright (c) 2025 R3BL LLC
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! `vtmux` CLI: the `server` and `attach` subcommands from §6 of the design.
//! Everything that matters (the emulator, the event log, the pane tree, the
//! wire protocol) lives in the library; this binary only resolves
//! configuration, wires up logging, and drives one of the two subcommands to
//! completion.
//!
//! Exit codes, per §6: `0` on clean exit, `1` on connection failure, `2` on a
//! configuration error.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use portable_pty::PtySize;

use vtmux::{core::{config::Config,
                    error::VtmuxError,
                    log::{DisplayPreference, TracingConfig, WriterConfig},
                    pane::NodeId,
                    pty::{PtyCommandBuilder, PtyConfig, PtyConfigOption}},
            network_io::{client::AttachClient, server::Server}};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// A terminal multiplexer daemon: owns PTY child processes, emulates their
/// screens, records every session byte for later replay, and multiplexes
/// panes onto clients connected over a local socket.
#[derive(Debug, Parser)]
#[command(name = "vtmux", version, about)]
struct Cli {
    /// Overrides the unix-domain socket path resolved from `XDG_RUNTIME_DIR`.
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Starts the daemon: binds the socket and spawns one pane running the
    /// user's shell so the first `attach` has something to connect to.
    Server {
        /// Command to run in the initial pane. Defaults to `$SHELL`, falling
        /// back to `/bin/sh`.
        #[arg(long)]
        shell: Option<String>,
        /// Scrollback rows kept per pane.
        #[arg(long, default_value_t = vtmux::core::config::DEFAULT_SCROLLBACK_CAPACITY)]
        scrollback: usize,
    },
    /// Connects to a running daemon and forwards stdin/stdout to a pane.
    Attach {
        /// Node ID of the pane to attach to. The first pane a freshly
        /// started `server` creates is always node 2 (node 1 is the root
        /// group), so this defaults to that.
        #[arg(long, default_value_t = 2)]
        pane: u32,
    },
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();
    let socket_path = cli.socket.clone().unwrap_or_else(|| config.socket_path.clone());

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("vtmux: failed to start the async runtime: {err}");
            return std::process::ExitCode::from(2);
        }
    };

    runtime.block_on(async move {
        match cli.command {
            Command::Server { shell, scrollback } => run_server(socket_path, shell, scrollback).await,
            Command::Attach { pane } => run_attach(socket_path, config.term, NodeId::from_raw(pane)).await,
        }
    })
}

fn install_logging(file_prefix: &str) {
    let tracing_config = TracingConfig {
        writer_config: WriterConfig::DisplayAndFile(DisplayPreference::Stderr, file_prefix.to_string()),
        level_filter: tracing_core::LevelFilter::INFO,
    };
    // Logging is an ambient concern (§6 design notes); a failure to install
    // it is not a reason to refuse to run the daemon or the client.
    let _unused = tracing_config.install_global();
}

fn default_shell(requested: Option<String>) -> String {
    requested
        .or_else(|| std::env::var("SHELL").ok())
        .unwrap_or_else(|| "/bin/sh".to_string())
}

async fn run_server(socket_path: PathBuf, shell: Option<String>, scrollback_capacity: usize) -> std::process::ExitCode {
    install_logging("vtmux-server");

    let server = Server::new(socket_path.clone(), scrollback_capacity);
    let tree = server.tree();
    {
        let mut guard = tree.write().await;
        let root = guard.root();
        let config: PtyConfig = PtyConfigOption::Size(PtySize { rows: 24, cols: 80, pixel_width: 0, pixel_height: 0 }).into();
        if let Err(err) = guard.new_pane(root, PtyCommandBuilder::new(default_shell(shell)), config) {
            eprintln!("vtmux: failed to spawn the initial pane: {err}");
            return std::process::ExitCode::from(2);
        }
    }

    tracing::info!(socket = %socket_path.display(), "vtmux server listening");
    match server.run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("vtmux: server error: {err}");
            std::process::ExitCode::from(exit_code_for(&err))
        }
    }
}

async fn run_attach(socket_path: PathBuf, term: String, node_id: NodeId) -> std::process::ExitCode {
    install_logging("vtmux-attach");

    let client = AttachClient::new(socket_path, node_id).with_term(term);
    match client.run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("vtmux: attach error: {err}");
            std::process::ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Maps a [`VtmuxError`] onto the exit codes named in §6: `1` for connection
/// failures, `2` for configuration problems, `1` as the catch-all for
/// anything else surfaced at the top level.
fn exit_code_for(err: &VtmuxError) -> u8 {
    match err {
        VtmuxError::Io(_) | VtmuxError::Timeout(_) => 1,
        VtmuxError::Invalid(_) | VtmuxError::Parse(_) | VtmuxError::NotFound(_) => 2,
    }
}
