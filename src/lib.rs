/*
 *   Copyright (c) 2022 R3BL LLC
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

//! # vtmux
//!
//! A terminal multiplexer daemon: panes are PTYs wrapped in a VT100/xterm
//! emulator (built on the [`vte`] crate), arranged in a tree of groups, and
//! made attachable over a unix-domain socket.
//!
//! ## Layout
//!
//! - [`core`] holds everything that doesn't know about the network: the
//!   emulator, the append-only event log and its replay engine, the pane/tree
//!   hierarchy, the PTY plumbing, the publish/subscribe fan-out used to mirror
//!   pane output to attached clients, the embedded-script callback registry,
//!   and the crate-wide error type.
//! - [`network_io`] is the daemon/client transport: a hand-rolled
//!   length-prefixed framing ([`network_io::wire`]) carried over a
//!   [`tokio::net::UnixStream`], the daemon-side [`network_io::server::Server`],
//!   and the attach-side [`network_io::client::AttachClient`].
//!
//! Everything is async, built on `tokio`. Fallible functions return
//! [`core::error::Result`]; binaries surface failures with `miette`'s
//! diagnostic rendering rather than a bare error chain.
//!
//! See `vtmux server` and `vtmux attach` for the CLI surface.

pub mod core;
pub mod network_io;

pub use core::*;
pub use network_io::*;
