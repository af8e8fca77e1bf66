// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The replay engine's top-level mode.

/// Which sub-mode the replay engine is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Playing back the session timeline.
    #[default]
    Time,
    /// Browsing the historical screen with a cursor and selection.
    Copy,
    /// Capturing a search pattern or time-jump expression.
    Input,
}
