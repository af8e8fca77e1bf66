// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Connect to source file.
pub mod ansi;
pub mod common;
pub mod config;
pub mod emulator;
pub mod error;
pub mod event_log;
pub mod log;
pub mod pane;
pub mod pty;
pub mod publisher;
pub mod replay;
pub mod script;

// Re-export.
pub use ansi::*;
pub use common::*;
pub use config::*;
pub use emulator::*;
pub use error::*;
pub use event_log::*;
pub use log::*;
pub use pane::*;
pub use pty::*;
pub use publisher::*;
pub use replay::*;
pub use script::*;
