// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod miette_setup_global_report_handler;
pub mod rate_limiter;
pub mod time_duration;
pub mod write_to_buf;

// Re-export.
pub use miette_setup_global_report_handler::*;
pub use rate_limiter::*;
pub use time_duration::*;
pub use write_to_buf::*;
