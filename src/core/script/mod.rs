// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The script callback registry: a name-indexed table of Rust closures an
//! embedded script interpreter can invoke. This crate does not embed or
//! evaluate a scripting language itself — it only exposes the table and the
//! typed value shuttle a caller's interpreter binds `call`/`register` forms
//! onto.

mod registry;
mod value;

pub use registry::Registry;
pub use value::{Context, Value};
