// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Process-wide configuration, resolved once at daemon (or client) start.
//!
//! Only what §6 names is read: `TERM`, `XDG_RUNTIME_DIR`, and `CY_CONFIG`. Nothing
//! here parses `CY_CONFIG` — that is the embedded script interpreter's job, out of
//! scope for this crate. `Config` just carries the resolved path along.

use std::{env, path::PathBuf};

/// Scrollback rows kept per pane when a caller doesn't ask for a specific capacity.
pub const DEFAULT_SCROLLBACK_CAPACITY: usize = 10_000;

/// Fallback `TERM` value used when the environment doesn't set one.
pub const DEFAULT_TERM: &str = "xterm-256color";

/// Directory name created under `XDG_RUNTIME_DIR` to hold the daemon's socket.
const SOCKET_DIR_NAME: &str = "vtmux";

/// Default socket file name within [`SOCKET_DIR_NAME`].
const SOCKET_FILE_NAME: &str = "default.sock";

/// Process-wide settings resolved from the environment (§6) plus whatever the
/// `server`/`attach` CLI flags override.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unix-domain socket the daemon listens on / the client connects to.
    pub socket_path: PathBuf,
    /// `XDG_RUNTIME_DIR`, or a temp-dir fallback when unset.
    pub runtime_dir: PathBuf,
    /// Inherited `TERM`, or [`DEFAULT_TERM`] if unset.
    pub term: String,
    /// `CY_CONFIG`, handed verbatim to the (out-of-scope) script interpreter.
    pub script_path: Option<PathBuf>,
    /// Rows kept in each pane's scrollback ring.
    pub scrollback_capacity: usize,
}

impl Config {
    /// Resolves configuration from the process environment, with no CLI overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let runtime_dir = env::var_os("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);
        let term = env::var("TERM").unwrap_or_else(|_| DEFAULT_TERM.to_string());
        let script_path = env::var_os("CY_CONFIG").map(PathBuf::from);
        let socket_path = runtime_dir.join(SOCKET_DIR_NAME).join(SOCKET_FILE_NAME);
        Self {
            socket_path,
            runtime_dir,
            term,
            script_path,
            scrollback_capacity: DEFAULT_SCROLLBACK_CAPACITY,
        }
    }

    /// Returns a copy of `self` with an explicit socket path, as set by a `--socket`
    /// CLI flag.
    #[must_use]
    pub fn with_socket_path(mut self, path: PathBuf) -> Self {
        self.socket_path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_falls_back_to_default_term() {
        // SAFETY: test-only mutation of the process environment, restored after.
        let prior = env::var_os("TERM");
        unsafe { env::remove_var("TERM") };
        let config = Config::from_env();
        assert_eq!(config.term, DEFAULT_TERM);
        if let Some(prior) = prior {
            unsafe { env::set_var("TERM", prior) };
        }
    }

    #[test]
    fn with_socket_path_overrides() {
        let config = Config::from_env().with_socket_path(PathBuf::from("/tmp/x.sock"));
        assert_eq!(config.socket_path, PathBuf::from("/tmp/x.sock"));
    }
}
