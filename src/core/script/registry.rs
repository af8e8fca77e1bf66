// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The callback table itself, keyed by name (`"log"`, `"key/bind"`,
//! `"pane/current"`, and whatever else a host registers).

use std::{collections::HashMap,
          sync::{Arc, Mutex}};

use super::value::Value;
use crate::core::error::{Result, VtmuxError, FREED_VALUE_MESSAGE};

/// A registered callback: a Rust closure the interpreter can invoke by name.
pub type Callback = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Each slot is independently freeable; freeing one name never locks out
/// lookups of any other, and a slot's own lock is only held for the duration
/// of cloning (or clearing) the `Arc` inside it — never across the callback
/// invocation itself, so a callback that registers or frees another name
/// doesn't deadlock.
type Slot = Arc<Mutex<Option<Callback>>>;

/// The name-indexed callback table. `Register(name, callback)` from the
/// design maps to [`Registry::register`]; an interpreter's `call` form maps
/// to [`Registry::invoke`]. The registry never evaluates anything itself —
/// it only stores and dispatches.
#[derive(Default)]
pub struct Registry {
    entries: Mutex<HashMap<String, Slot>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers `callback` under `name`, replacing whatever was registered
    /// there before (freed or not).
    pub fn register(&self, name: impl Into<String>, callback: Callback) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(name.into(), Arc::new(Mutex::new(Some(callback))));
    }

    fn slot(&self, name: &str) -> Result<Slot> {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.get(name).cloned().ok_or_else(|| VtmuxError::NotFound(format!("script callback \"{name}\"")))
    }

    /// Invokes the callback registered under `name` with `args`.
    ///
    /// # Errors
    /// [`VtmuxError::NotFound`] if no callback is registered under `name`,
    /// [`VtmuxError::Invalid`] (message [`FREED_VALUE_MESSAGE`]) if it was freed, or
    /// whatever the callback itself returns.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value> {
        let slot = self.slot(name)?;
        let callback = {
            let guard = slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.clone().ok_or_else(|| VtmuxError::Invalid(FREED_VALUE_MESSAGE.to_string()))?
        };
        callback(args)
    }

    /// Marks `name`'s callback as freed; subsequent [`Registry::invoke`] calls against it
    /// return `Invalid("cannot use freed value")` until it is [`Registry::register`]ed
    /// again.
    ///
    /// # Errors
    /// [`VtmuxError::NotFound`] if no callback is registered under `name`.
    pub fn free(&self, name: &str) -> Result<()> {
        let slot = self.slot(name)?;
        *slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool { self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner).contains_key(name) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn registered_callback_is_invoked_with_its_args() {
        let registry = Registry::new();
        registry.register("double", Arc::new(|args: &[Value]| Ok(Value::Int(args[0].as_int().unwrap_or(0) * 2))));
        assert_eq!(registry.invoke("double", &[Value::Int(21)]).unwrap(), Value::Int(42));
    }

    #[test]
    fn invoking_an_unregistered_name_is_not_found() {
        let registry = Registry::new();
        assert!(matches!(registry.invoke("missing", &[]), Err(VtmuxError::NotFound(_))));
    }

    #[test]
    fn freed_callback_returns_invalid_with_the_standard_message() {
        let registry = Registry::new();
        registry.register("log", Arc::new(|_args: &[Value]| Ok(Value::Unit)));
        registry.free("log").unwrap();
        let err = registry.invoke("log", &[]).unwrap_err();
        match err {
            VtmuxError::Invalid(message) => assert_eq!(message, FREED_VALUE_MESSAGE),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn re_registering_a_freed_name_makes_it_callable_again() {
        let registry = Registry::new();
        registry.register("log", Arc::new(|_args: &[Value]| Ok(Value::Unit)));
        registry.free("log").unwrap();
        registry.register("log", Arc::new(|_args: &[Value]| Ok(Value::Bool(true))));
        assert_eq!(registry.invoke("log", &[]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn is_registered_reflects_register_and_does_not_change_on_free() {
        let registry = Registry::new();
        assert!(!registry.is_registered("log"));
        registry.register("log", Arc::new(|_args: &[Value]| Ok(Value::Unit)));
        assert!(registry.is_registered("log"));
        registry.free("log").unwrap();
        assert!(registry.is_registered("log"));
    }
}
