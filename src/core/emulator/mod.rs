// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The terminal emulator: a byte-stream-driven VT500-family state machine
//! producing a screen buffer with scrollback, cursor, and dirty tracking.
//!
//! The VT parsing itself is the `vte` crate's table — the same mechanism
//! Alacritty uses to drive its own grid. [`performer::Performer`] is the
//! `vte::Perform` implementation that turns parsed actions into [`screen::Screen`]
//! mutations; it stays a thin shim, with the actual buffer semantics living as
//! inherent methods on `Screen` in [`ops`].

mod dirty;
mod emulator;
mod glyph;
mod ops;
mod performer;
mod screen;
mod scrollback;

pub use dirty::{ChangeMask, DirtyTracker};
pub use emulator::{Emulator, ScreenSnapshot};
pub use glyph::{Attrs, Color, Glyph};
pub use screen::{Cursor, CursorStyle, Modes, SavedCursor, ScrollRegion};
pub use scrollback::Scrollback;
