// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::Debug;

use tracing::dispatcher;
use tracing_core::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::try_create_layers;

/// Where to send formatted log lines.
///
/// - `tracing_log_file_path_and_prefix`: file path and prefix to use for the log file.
///   Eg: `/tmp/vtmux-server` or `vtmux-server`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(String /* tracing_log_file_path_and_prefix */),
    DisplayAndFile(DisplayPreference, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

/// Configure the tracing logging to suit your needs. You can display the logs to:
/// 1. a file,
/// 2. stdout or stderr,
/// 3. both.
///
/// This configuration also allows you to set the log level.
///
/// # Methods
/// - [`Self::install_global()`]: installs the global tracing subscriber for the daemon.
///   There can only be one, and it can't be unset once set.
/// - [`Self::install_thread_local()`]: installs the tracing subscriber for the current
///   thread only, used by tests so each test can have its own log capture.
#[derive(Debug)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

impl TracingConfig {
    /// # Errors
    /// Returns an error if the file writer cannot be created (invalid path,
    /// permissions) or the tracing layer cannot be initialized.
    pub fn install_thread_local(self) -> miette::Result<dispatcher::DefaultGuard> {
        try_create_layers(&self)
            .map(|layers| tracing_subscriber::registry().with(layers).set_default())
    }

    /// # Errors
    /// Returns an error if the file writer cannot be created, the tracing layer cannot
    /// be initialized, or a global subscriber has already been set.
    pub fn install_global(self) -> miette::Result<()> {
        try_create_layers(&self)
            .map(|layers| tracing_subscriber::registry().with(layers).init())
    }
}

impl TracingConfig {
    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_preference_eq() {
        assert_eq!(DisplayPreference::Stdout, DisplayPreference::Stdout);
        assert_ne!(DisplayPreference::Stdout, DisplayPreference::Stderr);
    }
}
