/*
 * // Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.
 */

//! ANSI helpers for the `attach` client side of the transport.
//!
//! The daemon's terminal emulation lives in [`crate::core::emulator`] and is driven
//! directly by the `vte` crate. This module covers what the *client* program needs
//! when it is forwarding a local terminal to the daemon: putting the local terminal
//! into raw mode for the duration of the session, and a small SGR sequence generator
//! used to render the attach client's own status line.

mod ansi_escape_codes;

pub mod terminal_raw_mode;

pub use ansi_escape_codes::*;
pub use terminal_raw_mode::*;
