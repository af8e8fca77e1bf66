// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod client;
pub mod protocol_types;
pub mod server;
pub mod wire;

// Re-export.
pub use client::*;
pub use protocol_types::*;
pub use server::*;
pub use wire::*;
